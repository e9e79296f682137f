//! Todo Commands

use tasker_core::domain::{DomainError, Status, Todo, TodoId, TodoInput, TodoPatch, UserId};
use tasker_core::{AssetUpload, Change, ChangeFeedSubscriber, Subscription};

use crate::context::AppContext;
use crate::models::ToastKind;
use crate::store::{store_apply, store_find, store_reset, store_seed, StoreTarget};

// ========================
// Queries
// ========================

/// Initial fetch for the list view. A failure leaves an empty list.
pub async fn load_todos(ctx: AppContext, owner: UserId) {
    store_reset(&ctx.store);
    match ctx.services().todos.list(&owner).await {
        Ok(todos) => {
            log::info!("[APP] Loaded {} todos", todos.len());
            store_seed(&ctx.store, todos);
        }
        Err(e) => {
            store_seed(&ctx.store, Vec::new());
            ctx.report(&e);
        }
    }
}

/// Keep the list live until the handle is dropped.
pub async fn watch_todos(ctx: AppContext, owner: UserId) -> Option<Subscription> {
    let feed = ctx.services().feed;
    match ChangeFeedSubscriber::attach(feed.as_ref(), &owner, StoreTarget(ctx.store)).await {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            log::error!("[APP] Live updates unavailable: {}", e);
            if e.is_auth() {
                ctx.report(&e);
            }
            None
        }
    }
}

/// One record for the detail view; the list cache answers first.
pub async fn fetch_todo(ctx: AppContext, id: TodoId) -> Result<Todo, DomainError> {
    if let Some(cached) = store_find(&ctx.store, &id) {
        return Ok(cached);
    }
    let result = ctx.services().todos.get(&id).await;
    if let Err(e) = &result {
        if e.is_auth() {
            ctx.report(e);
        } else {
            log::warn!("[APP] Could not load todo {}: {}", id, e);
        }
    }
    result
}

// ========================
// Mutations
// ========================

/// Validation failures come back for inline display; everything else is
/// reported here.
pub async fn create_todo(ctx: AppContext, input: TodoInput, cover: Option<AssetUpload>) -> Result<Todo, DomainError> {
    match ctx.services().todos.create(input, cover).await {
        Ok(todo) => {
            store_apply(&ctx.store, Change::Insert(todo.clone()));
            ctx.success("Todo created successfully.");
            Ok(todo)
        }
        Err(e) => {
            if !matches!(e, DomainError::Validation(_)) {
                ctx.report(&e);
            }
            Err(e)
        }
    }
}

/// Save the edit form. Only changed fields are sent.
pub async fn save_todo(
    ctx: AppContext,
    current: Todo,
    input: TodoInput,
    cover: Option<AssetUpload>,
) -> Result<Todo, DomainError> {
    let patch = input.patch_for(&current);
    if patch.is_empty() && cover.is_none() {
        ctx.toast(ToastKind::Info, "Nothing to update.");
        return Ok(current);
    }

    match ctx.services().todos.update_with_cover(&current, patch, cover).await {
        Ok(outcome) => {
            store_apply(&ctx.store, Change::Update(outcome.todo.clone()));
            match &outcome.upload_error {
                Some(e) => ctx.toast(ToastKind::Error, e.user_message()),
                None => ctx.success("Todo updated successfully."),
            }
            Ok(outcome.todo)
        }
        Err(e) => {
            if !matches!(e, DomainError::Validation(_)) {
                ctx.report(&e);
            }
            Err(e)
        }
    }
}

/// Quick status change from a card
pub async fn set_status(ctx: AppContext, id: TodoId, status: Status) -> Option<Todo> {
    let patch = TodoPatch { status: Some(status), ..Default::default() };
    match ctx.services().todos.update(&id, &patch).await {
        Ok(todo) => {
            store_apply(&ctx.store, Change::Update(todo.clone()));
            Some(todo)
        }
        Err(e) => {
            ctx.report(&e);
            None
        }
    }
}

pub async fn delete_todo(ctx: AppContext, id: TodoId) -> bool {
    match ctx.services().todos.delete(&id).await {
        Ok(()) => {
            store_apply(&ctx.store, Change::Delete(id));
            ctx.success("Todo deleted successfully.");
            true
        }
        Err(e) => {
            log::error!("[APP] Delete of {} failed: {}", id, e);
            if e.is_auth() {
                ctx.report(&e);
            } else {
                ctx.toast(ToastKind::Error, "Failed to delete todo.");
            }
            false
        }
    }
}
