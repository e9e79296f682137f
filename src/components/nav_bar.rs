//! Top navigation bar

use leptos::prelude::*;
use tasker_core::Route;

use crate::components::{Link, SignOutButton};
use crate::context::use_app_context;

#[component]
pub fn NavBar() -> impl IntoView {
    let ctx = use_app_context();
    let signed_in = move || ctx.session.with(|s| s.is_some());

    view! {
        <nav class="nav-bar">
            <Link to=Route::Home class="brand">"Tasker"</Link>
            <div class="nav-links">
                <Show
                    when=signed_in
                    fallback=|| view! {
                        <Link to=Route::SignIn class="nav-link">"Sign in"</Link>
                        <Link to=Route::SignUp class="nav-link nav-cta">"Sign up"</Link>
                    }
                >
                    <Link to=Route::Dashboard class="nav-link">"Dashboard"</Link>
                    <SignOutButton />
                </Show>
            </div>
        </nav>
    }
}
