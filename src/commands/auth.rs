//! Auth Commands
//!
//! Failures come back as the message to show under the form.

use tasker_core::domain::{Credentials, OAuthProvider, SignUpOutcome};
use tasker_core::Route;

use crate::browser::history;
use crate::context::AppContext;

pub async fn sign_in(ctx: AppContext, credentials: Credentials) -> Result<(), String> {
    let auth = ctx.services().auth;
    match auth.sign_in_with_password(&credentials.email, &credentials.password).await {
        Ok(session) => {
            log::info!("[AUTH] Signed in as {}", session.user_id());
            ctx.set_session(Some(session));
            ctx.navigate(Route::Dashboard);
            Ok(())
        }
        Err(e) => {
            log::warn!("[AUTH] Sign-in failed: {}", e);
            Err(e.user_message())
        }
    }
}

pub async fn sign_up(ctx: AppContext, credentials: Credentials, captcha_token: Option<String>) -> Result<(), String> {
    let auth = ctx.services().auth;
    match auth.sign_up(&credentials.email, &credentials.password, captcha_token.as_deref()).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            ctx.set_session(Some(session));
            ctx.success("Welcome to Tasker!");
            ctx.redirect(Route::Dashboard);
            Ok(())
        }
        Ok(SignUpOutcome::ConfirmationSent) => {
            ctx.redirect(Route::ConfirmEmail);
            Ok(())
        }
        Err(e) => {
            log::warn!("[AUTH] Sign-up failed: {}", e);
            Err(e.user_message())
        }
    }
}

pub async fn sign_out(ctx: AppContext) {
    if let Err(e) = ctx.services().auth.sign_out().await {
        log::warn!("[AUTH] Remote sign-out failed, local session cleared anyway: {}", e);
    }
    ctx.set_session(None);
    ctx.redirect(Route::SignIn);
}

/// Send the reset link. The link lands on the update-password view.
pub async fn request_password_reset(ctx: AppContext, email: String) -> Result<(), String> {
    let services = ctx.services();
    let redirect_to = Route::UpdatePassword.absolute(&services.config.app_url).map_err(|e| e.user_message())?;
    services.auth.reset_password_for_email(&email, &redirect_to).await.map_err(|e| {
        log::warn!("[AUTH] Password reset request failed: {}", e);
        e.user_message()
    })
}

pub async fn update_password(ctx: AppContext, password: String) -> Result<(), String> {
    match ctx.services().auth.update_password(&password).await {
        Ok(_) => {
            ctx.success("Password updated. Please sign in.");
            ctx.redirect(Route::SignIn);
            Ok(())
        }
        Err(e) => {
            log::warn!("[AUTH] Password update failed: {}", e);
            Err(e.user_message())
        }
    }
}

/// Leave for the provider's consent page.
pub fn start_oauth(ctx: AppContext, provider: OAuthProvider) -> Result<(), String> {
    let services = ctx.services();
    let redirect_to = Route::AuthCallback.absolute(&services.config.app_url).map_err(|e| e.user_message())?;
    let url = services.auth.provider_sign_in_url(provider, &redirect_to).map_err(|e| {
        log::warn!("[AUTH] {} sign-in unavailable: {}", provider.as_str(), e);
        e.user_message()
    })?;
    log::info!("[AUTH] Redirecting to {} sign-in", provider.as_str());
    history::leave_to(url.as_str());
    Ok(())
}

/// Finish a redirect from an email link or an OAuth provider.
pub async fn complete_redirect(ctx: AppContext, fragment: String) {
    match ctx.services().auth.complete_redirect(&fragment).await {
        Ok(session) => {
            log::info!("[AUTH] Redirect completed for {}", session.user_id());
            ctx.set_session(Some(session));
            ctx.redirect(Route::Dashboard);
        }
        Err(e) => {
            log::error!("[AUTH] Redirect could not be completed: {}", e);
            ctx.redirect(Route::SignUpError);
        }
    }
}

/// Sign in with the tokens of a password-recovery link so the password can
/// be changed.
pub async fn accept_recovery_link(ctx: AppContext, fragment: String) -> Result<(), String> {
    let session = ctx.services().auth.complete_redirect(&fragment).await.map_err(|e| {
        log::error!("[AUTH] Recovery link rejected: {}", e);
        e.user_message()
    })?;
    ctx.set_session(Some(session));
    // Drop the tokens from the address bar.
    history::replace(&Route::UpdatePassword);
    Ok(())
}
