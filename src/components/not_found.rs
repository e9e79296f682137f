use leptos::prelude::*;
use tasker_core::Route;

use crate::components::Link;

#[component]
pub fn NotFound(path: String) -> impl IntoView {
    log::warn!("[APP] No view for {}", path);

    view! {
        <div class="not-found">
            <h1>"404"</h1>
            <p>"The page you are looking for does not exist."</p>
            <Link to=Route::Home class="btn">"Go back home"</Link>
        </div>
    }
}
