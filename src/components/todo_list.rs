//! Todo List Component
//!
//! Renders the reconciled list: placeholders while the first fetch is
//! outstanding, an empty state, or the cards newest first.

use leptos::prelude::*;
use tasker_core::ListView;

use crate::components::TodoCard;
use crate::store::{use_app_store, AppStateStoreFields};

const PLACEHOLDER_CARDS: usize = 3;

#[component]
pub fn TodoList() -> impl IntoView {
    let store = use_app_store();

    view! {
        <section class="todo-grid">
            {move || store.todos().with(|list| match list.view() {
                ListView::Loading => (0..PLACEHOLDER_CARDS)
                    .map(|_| view! {
                        <div class="todo-card skeleton">
                            <div class="skeleton-cover"></div>
                            <div class="skeleton-line"></div>
                            <div class="skeleton-line short"></div>
                        </div>
                    })
                    .collect_view()
                    .into_any(),
                ListView::Empty => view! {
                    <p class="empty-state">"No todos yet. Add your first one above."</p>
                }
                .into_any(),
                ListView::Ready(todos) => todos
                    .iter()
                    .cloned()
                    .map(|todo| view! { <TodoCard todo=todo /> })
                    .collect_view()
                    .into_any(),
            })}
        </section>
    }
}
