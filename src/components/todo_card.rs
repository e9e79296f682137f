//! Todo Card Component
//!
//! One record in the dashboard grid. Clicking the card opens the detail view.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::Route;
use web_sys::HtmlSelectElement;

use crate::commands;
use crate::context::use_app_context;
use crate::models::{format_due, priority_class, settled_status, status_class, Status, Todo};

#[component]
pub fn TodoCard(todo: Todo) -> impl IntoView {
    let ctx = use_app_context();
    let id = todo.id.clone();
    let open_id = id.clone();
    let current_status = todo.status;

    let cover = match todo.cover_image.clone() {
        Some(src) => view! { <img class="card-cover" src=src alt="cover image" /> }.into_any(),
        None => view! { <div class="card-cover card-cover-placeholder"></div> }.into_any(),
    };

    view! {
        <article class="todo-card" on:click=move |_| ctx.navigate(Route::TodoDetail(open_id.clone()))>
            {cover}
            <header>
                <h3 class="card-title">{todo.title.clone()}</h3>
                {todo.description.clone().map(|d| view! { <p class="card-description">{d}</p> })}
            </header>
            <div class="card-meta">
                <span class="due">{format_due(todo.due)}</span>
                <span class=priority_class(todo.priority)>{todo.priority.as_str()}</span>
                <select
                    class=status_class(todo.status)
                    on:click=|ev| ev.stop_propagation()
                    on:change=move |ev| {
                        let Some(status) = Status::parse(&event_target_value(&ev)) else { return };
                        if status == current_status {
                            return;
                        }
                        let select = event_target::<HtmlSelectElement>(&ev);
                        let id = id.clone();
                        spawn_local(async move {
                            let saved = commands::set_status(ctx, id, status).await;
                            // A saved change re-renders the card from the store.
                            select.set_value(settled_status(current_status, saved.as_ref()).as_str());
                        });
                    }
                >
                    {Status::ALL
                        .into_iter()
                        .map(|s| view! { <option value=s.as_str() selected=s == current_status>{s.label()}</option> })
                        .collect_view()}
                </select>
            </div>
            <footer class="card-footer">
                "Created: " {todo.created_at.format("%b %-d, %Y %H:%M").to_string()}
            </footer>
        </article>
    }
}
