//! Static pages shown after sign-up

use leptos::prelude::*;
use tasker_core::Route;

use crate::components::Link;

#[component]
pub fn ConfirmEmail() -> impl IntoView {
    view! {
        <div class="notice-card">
            <h1>"Check your email"</h1>
            <p>
                "We've sent a confirmation link to your inbox. Please follow it to verify your account."
            </p>
        </div>
    }
}

#[component]
pub fn SignUpError() -> impl IntoView {
    view! {
        <div class="notice-card notice-error">
            <p>"An error has occurred while signing up."</p>
            <p>"Please try again or contact support."</p>
            <Link to=Route::Home>"Go back to home page"</Link>
        </div>
    }
}
