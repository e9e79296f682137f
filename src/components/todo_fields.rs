//! Todo Form Fields
//!
//! Inputs shared by the create and update forms. Values live in a
//! `TodoForm` signal and are validated on submit by the owning form.

use chrono::NaiveDate;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::{check_image_type, Priority, Status, TodoForm};
use tasker_core::AssetUpload;
use web_sys::HtmlInputElement;

use crate::browser::read_upload;
use crate::components::FieldError;
use crate::models::ValidationErrors;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[component]
pub fn TodoFields(form: RwSignal<TodoForm>, errors: RwSignal<ValidationErrors>) -> impl IntoView {
    view! {
        <label class="field">
            <span>"Title"</span>
            <input
                type="text"
                placeholder="Buy groceries"
                prop:value=move || form.with(|f| f.title.clone())
                on:input=move |ev| form.update(|f| f.title = event_target_value(&ev))
            />
            <FieldError errors=errors field="title" />
        </label>

        <label class="field">
            <span>"Description"</span>
            <textarea
                rows="3"
                placeholder="Milk, eggs, bread"
                prop:value=move || form.with(|f| f.description.clone())
                on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
            ></textarea>
            <FieldError errors=errors field="description" />
        </label>

        <div class="field-row">
            <label class="field">
                <span>"Due date"</span>
                <input
                    type="date"
                    prop:value=move || {
                        form.with(|f| f.due_date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default())
                    }
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.due_date = NaiveDate::parse_from_str(&value, DATE_FORMAT).ok());
                    }
                />
            </label>
            <label class="field">
                <span>"Time (UTC)"</span>
                <input
                    type="time"
                    step="1"
                    prop:value=move || form.with(|f| f.due_time.clone())
                    on:input=move |ev| form.update(|f| f.due_time = event_target_value(&ev))
                />
                <FieldError errors=errors field="due" />
            </label>
        </div>

        <div class="field-row">
            <label class="field">
                <span>"Priority"</span>
                <select on:change=move |ev| form.update(|f| f.priority = event_target_value(&ev))>
                    {Priority::ALL
                        .into_iter()
                        .map(|p| view! {
                            <option value=p.as_str() prop:selected=move || form.with(|f| f.priority == p.as_str())>
                                {p.label()}
                            </option>
                        })
                        .collect_view()}
                </select>
                <FieldError errors=errors field="priority" />
            </label>
            <label class="field">
                <span>"Status"</span>
                <select on:change=move |ev| form.update(|f| f.status = event_target_value(&ev))>
                    {Status::ALL
                        .into_iter()
                        .map(|s| view! {
                            <option value=s.as_str() prop:selected=move || form.with(|f| f.status == s.as_str())>
                                {s.label()}
                            </option>
                        })
                        .collect_view()}
                </select>
                <FieldError errors=errors field="status" />
            </label>
        </div>
    }
}

/// File input for the cover image with a preview.
///
/// The picked file is read right away so the form holds plain bytes. When
/// nothing new is picked the `existing` cover is previewed.
#[component]
pub fn CoverPicker(
    cover: RwSignal<Option<AssetUpload>>,
    errors: RwSignal<ValidationErrors>,
    #[prop(optional_no_strip)] existing: Option<String>,
) -> impl IntoView {
    let (preview, set_preview) = signal(existing);
    let (reading, set_reading) = signal(false);

    let on_change = move |ev: web_sys::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            cover.set(None);
            return;
        };

        errors.update(|e| *e = without_field(e, "cover_image"));
        if let Err(rejected) = check_image_type(&file.type_()) {
            input.set_value("");
            cover.set(None);
            errors.update(|e| *e = merge(e, &rejected));
            return;
        }

        match web_sys::Url::create_object_url_with_blob(&file) {
            Ok(url) => set_preview.set(Some(url)),
            Err(e) => log::warn!("[FORM] No preview for {}: {:?}", file.name(), e),
        }

        set_reading.set(true);
        spawn_local(async move {
            match read_upload(&file).await {
                Ok(upload) => cover.set(Some(upload)),
                Err(e) => {
                    cover.set(None);
                    errors.update(|errs| errs.push("cover_image", e.user_message()));
                }
            }
            set_reading.set(false);
        });
    };

    view! {
        <label class="field">
            <span>"Cover image"</span>
            {move || preview.get().map(|src| view! { <img class="cover-preview" src=src alt="Cover preview" /> })}
            <input type="file" accept="image/*" on:change=on_change />
            <Show when=move || reading.get()>
                <p class="field-hint">"Reading file..."</p>
            </Show>
            <FieldError errors=errors field="cover_image" />
        </label>
    }
}

fn without_field(errors: &ValidationErrors, field: &str) -> ValidationErrors {
    errors.iter().filter(|e| e.field != field).cloned().collect::<Vec<_>>().into()
}

fn merge(errors: &ValidationErrors, more: &ValidationErrors) -> ValidationErrors {
    errors.iter().chain(more.iter()).cloned().collect::<Vec<_>>().into()
}
