//! Record Store Adapter
//!
//! Wraps the record store and asset storage behind the operations the views
//! need. Instances are constructed explicitly and passed to whoever needs
//! them; there is no process-wide client.

use std::rc::Rc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    check_image_type, check_patch, DomainError, DomainResult, Session, Todo, TodoId, TodoInput, TodoPatch, UserId,
};
use crate::repository::{AssetStorage, AuthProvider, RecordStore};

/// A file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AssetUpload {
    fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
            _ => "bin",
        }
    }
}

/// Result of an update that may have carried a new cover image
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub todo: Todo,
    /// Set when the new cover failed to upload; the record was saved with
    /// its previous cover.
    pub upload_error: Option<DomainError>,
}

#[derive(Clone)]
pub struct TodoStore {
    auth: Rc<dyn AuthProvider>,
    records: Rc<dyn RecordStore>,
    assets: Rc<dyn AssetStorage>,
}

impl TodoStore {
    pub fn new(auth: Rc<dyn AuthProvider>, records: Rc<dyn RecordStore>, assets: Rc<dyn AssetStorage>) -> Self {
        Self { auth, records, assets }
    }

    async fn require_session(&self) -> DomainResult<Session> {
        self.auth
            .get_session()
            .await?
            .ok_or_else(|| DomainError::Auth("Your session has expired. Please sign in again.".to_string()))
    }

    /// All records owned by `owner`.
    pub async fn list(&self, owner: &UserId) -> DomainResult<Vec<Todo>> {
        let todos = self.records.select(owner).await?;
        log::info!("[STORE] Loaded {} todos", todos.len());
        Ok(todos)
    }

    pub async fn get(&self, id: &TodoId) -> DomainResult<Todo> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("todo {}", id)))
    }

    /// Persist a validated input owned by the signed-in user.
    pub async fn create(&self, input: TodoInput, cover: Option<AssetUpload>) -> DomainResult<Todo> {
        input.check()?;
        if let Some(file) = &cover {
            check_image_type(&file.content_type)?;
        }
        let session = self.require_session().await?;
        let owner = session.user_id().clone();

        let cover_image = match cover {
            Some(file) => Some(self.upload_asset(&file, &owner).await?),
            None => None,
        };

        let created = match self.records.insert(&input.into_new_todo(owner, cover_image.clone())).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(url) = &cover_image {
                    self.delete_asset(url).await;
                }
                return Err(e);
            }
        };
        log::info!("[STORE] Created todo {}", created.id);
        Ok(created)
    }

    /// Partial update: fields absent from `patch` keep their stored values.
    pub async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo> {
        check_patch(patch)?;
        self.require_session().await?;

        let updated = self.records.update(id, patch).await?;
        log::info!("[STORE] Updated todo {}", id);
        Ok(updated)
    }

    /// Update, optionally replacing the cover image.
    ///
    /// The new image is uploaded first. If that fails the rest of the patch
    /// is still saved with the previous cover and the failure is reported in
    /// the outcome. Once the record points at a new cover the previous asset
    /// is removed best-effort.
    pub async fn update_with_cover(
        &self,
        current: &Todo,
        mut patch: TodoPatch,
        new_cover: Option<AssetUpload>,
    ) -> DomainResult<UpdateOutcome> {
        check_patch(&patch)?;
        if let Some(file) = &new_cover {
            check_image_type(&file.content_type)?;
        }
        let session = self.require_session().await?;

        let mut upload_error = None;
        if let Some(file) = &new_cover {
            match self.upload_asset(file, session.user_id()).await {
                Ok(url) => patch.cover_image = Some(Some(url)),
                Err(e) => {
                    log::error!("[STORE] Cover upload failed for {}: {}", current.id, e);
                    upload_error = Some(e);
                }
            }
        }

        let todo = if patch.is_empty() {
            current.clone()
        } else {
            match self.records.update(&current.id, &patch).await {
                Ok(todo) => todo,
                Err(e) => {
                    if let (Some(Some(uploaded)), None) = (&patch.cover_image, &upload_error) {
                        self.delete_asset(uploaded).await;
                    }
                    return Err(e);
                }
            }
        };

        if let (Some(Some(_)), Some(previous)) = (&patch.cover_image, &current.cover_image) {
            self.delete_asset(previous).await;
        }

        Ok(UpdateOutcome { todo, upload_error })
    }

    /// Remove a record. If it had a cover image, exactly one best-effort
    /// asset delete follows; its failure never fails the call.
    pub async fn delete(&self, id: &TodoId) -> DomainResult<()> {
        self.require_session().await?;

        let deleted = self.records.delete(id).await?;
        log::info!("[STORE] Deleted todo {}", id);

        if let Some(url) = deleted.and_then(|t| t.cover_image) {
            self.delete_asset(&url).await;
        }
        Ok(())
    }

    /// Store a binary under a key scoped to `owner` and return its public URL.
    pub async fn upload_asset(&self, file: &AssetUpload, owner: &UserId) -> DomainResult<String> {
        let path = asset_path(owner, file.extension());
        self.assets
            .upload(&path, &file.bytes, &file.content_type)
            .await
            .map_err(|e| match e {
                passthrough @ (DomainError::Upload(_) | DomainError::Auth(_)) => passthrough,
                other => DomainError::Upload(other.to_string()),
            })?;
        Ok(self.assets.public_url(&path))
    }

    /// Remove the object behind `url`. Failures are logged only.
    pub async fn delete_asset(&self, url: &str) {
        let Some(path) = self.assets.path_from_public_url(url) else {
            log::warn!("[STORE] Not a storage URL, skipping cleanup: {}", url);
            return;
        };
        if let Err(e) = self.assets.remove(&path).await {
            let e = DomainError::AssetCleanup(e.to_string());
            log::warn!("[STORE] {}", e);
        }
    }
}

fn asset_path(owner: &UserId, extension: &str) -> String {
    format!(
        "{owner}/{owner}-{millis}-{token}.{extension}",
        millis = Utc::now().timestamp_millis(),
        token = Uuid::new_v4().simple(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path_is_owner_scoped_and_unique() {
        let owner = UserId::new("u-1");
        let a = asset_path(&owner, "png");
        let b = asset_path(&owner, "png");

        assert!(a.starts_with("u-1/u-1-"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_fallback() {
        let file = |name: &str| AssetUpload { file_name: name.into(), content_type: "image/png".into(), bytes: vec![] };
        assert_eq!(file("cat.jpeg").extension(), "jpeg");
        assert_eq!(file("noext").extension(), "bin");
        assert_eq!(file("trailing.").extension(), "bin");
    }
}
