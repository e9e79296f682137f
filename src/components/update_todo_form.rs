//! Update Todo Form Component
//!
//! Edit drawer body. Prefilled from the record; only changed fields are
//! saved. A new cover replaces the old one after the save.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::{DomainError, TodoForm};
use tasker_core::AssetUpload;

use crate::commands;
use crate::components::{CoverPicker, TodoFields};
use crate::context::use_app_context;
use crate::models::{Todo, ValidationErrors};

#[component]
pub fn UpdateTodoForm(
    todo: Todo,
    #[prop(into)] on_saved: Callback<Todo>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let ctx = use_app_context();

    let form = RwSignal::new(TodoForm::from_todo(&todo));
    let errors = RwSignal::new(ValidationErrors::default());
    let cover = RwSignal::new(None::<AssetUpload>);
    let (saving, set_saving) = signal(false);
    let existing_cover = todo.cover_image.clone();
    let current = StoredValue::new(todo);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
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
        set_saving.set(true);

        let file = cover.get_untracked();
        let current = current.get_value();
        spawn_local(async move {
            match commands::save_todo(ctx, current, input, file).await {
                Ok(saved) => on_saved.run(saved),
                Err(DomainError::Validation(invalid)) => errors.set(invalid),
                Err(_) => {}
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="todo-form update-todo-form" on:submit=submit>
            <h2>"Update Todo"</h2>
            <p class="form-hint">"Edit the details below to update this todo."</p>
            <TodoFields form=form errors=errors />
            <CoverPicker cover=cover errors=errors existing=existing_cover />
            <div class="form-actions">
                <button type="button" class="btn" on:click=move |_| on_cancel.run(())>
                    "Cancel"
                </button>
                <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                    {move || if saving.get() { "Saving..." } else { "Save changes" }}
                </button>
            </div>
        </form>
    }
}
