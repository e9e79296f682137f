//! Reading picked files

use js_sys::Uint8Array;
use tasker_core::domain::DomainError;
use tasker_core::{AssetUpload, DomainResult};
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

/// Load the whole file into memory for upload.
pub async fn read_upload(file: &File) -> DomainResult<AssetUpload> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| DomainError::Upload(format!("could not read {}: {:?}", file.name(), e)))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    log::debug!("[FILES] Read {} ({} bytes)", file.name(), bytes.len());
    Ok(AssetUpload { file_name: file.name(), content_type: file.type_(), bytes })
}
