//! Todo Detail Page
//!
//! Full view of one record with an edit drawer and a delete confirmation.
//! After a delete the user is sent back to the dashboard.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::Route;

use crate::commands;
use crate::components::{DeleteConfirmButton, Link, UpdateTodoForm};
use crate::context::use_app_context;
use crate::models::{format_due, priority_class, status_class, Todo, TodoId};

#[derive(Debug, Clone, PartialEq)]
enum Loaded {
    Pending,
    Found(Todo),
    Missing(String),
}

#[component]
pub fn TodoDetail(id: TodoId) -> impl IntoView {
    let ctx = use_app_context();
    let state = RwSignal::new(Loaded::Pending);
    let (drawer_open, set_drawer_open) = signal(false);
    let (deleting, set_deleting) = signal(false);

    spawn_local({
        let id = id.clone();
        async move {
            let loaded = match commands::fetch_todo(ctx, id).await {
                Ok(todo) => Loaded::Found(todo),
                Err(e) => Loaded::Missing(e.user_message()),
            };
            let _ = state.try_set(loaded);
        }
    });

    let on_delete = Callback::new(move |_: ()| {
        let id = id.clone();
        set_deleting.set(true);
        spawn_local(async move {
            commands::delete_todo(ctx, id).await;
            let _ = set_deleting.try_set(false);
            if ctx.session.get_untracked().is_some() {
                ctx.redirect(Route::Dashboard);
            }
        });
    });

    let on_saved = Callback::new(move |saved: Todo| {
        state.set(Loaded::Found(saved));
        set_drawer_open.set(false);
    });

    move || match state.get() {
        Loaded::Pending => view! {
            <div class="todo-detail skeleton">
                <div class="skeleton-cover tall"></div>
                <div class="skeleton-line"></div>
                <div class="skeleton-line"></div>
                <div class="skeleton-line short"></div>
            </div>
        }
        .into_any(),
        Loaded::Missing(message) => view! {
            <div class="todo-detail missing">
                <p>{message}</p>
                <Link to=Route::Dashboard class="btn">"Back to dashboard"</Link>
            </div>
        }
        .into_any(),
        Loaded::Found(todo) => {
            let for_form = todo.clone();
            view! {
                <div class="todo-detail">
                    {match todo.cover_image.clone() {
                        Some(src) => view! { <img class="detail-cover" src=src alt="Todo cover" /> }.into_any(),
                        None => view! { <div class="detail-cover card-cover-placeholder"></div> }.into_any(),
                    }}
                    <main class="detail-body">
                        <Link to=Route::Dashboard class="back-link">"Back to dashboard"</Link>
                        <h1>{todo.title.clone()}</h1>
                        <dl class="detail-meta">
                            <dt>"Due"</dt>
                            <dd>{format_due(todo.due)}</dd>
                            <dt>"Priority"</dt>
                            <dd><span class=priority_class(todo.priority)>{todo.priority.label()}</span></dd>
                            <dt>"Status"</dt>
                            <dd><span class=status_class(todo.status)>{todo.status.label()}</span></dd>
                            <dt>"Created"</dt>
                            <dd>{todo.created_at.format("%B %-d, %Y %H:%M").to_string()}</dd>
                        </dl>
                        {todo.description.clone().map(|d| view! { <p class="detail-description">{d}</p> })}
                        <div class="detail-actions">
                            <button class="btn" on:click=move |_| set_drawer_open.set(true)>"Edit"</button>
                            <DeleteConfirmButton
                                button_class="btn btn-danger"
                                on_confirm=on_delete
                                disabled=Signal::derive(move || deleting.get())
                            />
                        </div>
                    </main>
                    <Show when=move || drawer_open.get()>
                        <aside class="drawer">
                            <UpdateTodoForm
                                todo=for_form.clone()
                                on_saved=on_saved
                                on_cancel=move |_| set_drawer_open.set(false)
                            />
                        </aside>
                    </Show>
                </div>
            }
            .into_any()
        }
    }
}
