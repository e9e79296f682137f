//! Create Todo Form Component

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::{DomainError, TodoForm};
use tasker_core::AssetUpload;

use crate::commands;
use crate::components::{CoverPicker, TodoFields};
use crate::context::use_app_context;
use crate::models::ValidationErrors;

#[component]
pub fn CreateTodoForm() -> impl IntoView {
    let ctx = use_app_context();

    let form = RwSignal::new(TodoForm::default());
    let errors = RwSignal::new(ValidationErrors::default());
    let cover = RwSignal::new(None::<AssetUpload>);
    let (submitting, set_submitting) = signal(false);
    // Bumped after a successful create to clear the file input.
    let (generation, set_generation) = signal(0u32);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let input = match form.with_untracked(|f| f.validate()) {
            Ok(input) => input,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        set_submitting.set(true);

        let file = cover.get_untracked();
        spawn_local(async move {
            match commands::create_todo(ctx, input, file).await {
                Ok(_) => {
                    form.set(TodoForm::default());
                    cover.set(None);
                    set_generation.update(|g| *g += 1);
                }
                Err(DomainError::Validation(invalid)) => errors.set(invalid),
                Err(_) => {}
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="todo-form create-todo-form" on:submit=submit>
            <h2>"New todo"</h2>
            <TodoFields form=form errors=errors />
            {move || {
                generation.track();
                view! { <CoverPicker cover=cover errors=errors /> }
            }}
            <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                {move || if submitting.get() { "Adding..." } else { "Add todo" }}
            </button>
        </form>
    }
}
