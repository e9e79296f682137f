//! Storage API endpoints for cover images

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::{check, send, Op, SupabaseClient};
use crate::domain::DomainResult;
use crate::repository::traits::AssetStorage;

impl SupabaseClient {
    fn public_prefix(&self) -> String {
        format!("{}storage/v1/object/public/{}/", self.base, self.bucket)
    }
}

#[async_trait(?Send)]
impl AssetStorage for SupabaseClient {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> DomainResult<()> {
        let token = self.access_token().await?;
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", self.bucket, path))?;
        let request = self
            .request(Method::POST, url, token.as_deref())
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec());

        let response = send(request).await?;
        check(Op::Upload, response).await?;
        log::info!("[REST] Uploaded {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_prefix(), path)
    }

    fn path_from_public_url(&self, url: &str) -> Option<String> {
        if let Some(path) = url.strip_prefix(&self.public_prefix()) {
            return Some(path.to_string()).filter(|p| !p.is_empty());
        }
        // URLs minted under another host alias still carry the bucket segment.
        let marker = format!("/{}/", self.bucket);
        url.split_once(&marker)
            .map(|(_, path)| path.to_string())
            .filter(|p| !p.is_empty())
    }

    async fn remove(&self, path: &str) -> DomainResult<()> {
        let token = self.access_token().await?;
        let url = self.endpoint(&format!("storage/v1/object/{}", self.bucket))?;
        let request = self
            .request(Method::DELETE, url, token.as_deref())
            .json(&json!({ "prefixes": [path] }));

        let response = send(request).await?;
        check(Op::Remove, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::rest::tests::client;

    #[test]
    fn test_public_url_round_trip() {
        let client = client();
        let url = client.public_url("u-1/u-1-1700000000000-abc.png");

        assert_eq!(
            url,
            "https://project.supabase.co/storage/v1/object/public/todos_cover_images/u-1/u-1-1700000000000-abc.png"
        );
        assert_eq!(client.path_from_public_url(&url).as_deref(), Some("u-1/u-1-1700000000000-abc.png"));
    }

    #[test]
    fn test_path_from_foreign_urls() {
        let client = client();
        assert_eq!(
            client.path_from_public_url("https://cdn.example.com/todos_cover_images/u/x.jpg").as_deref(),
            Some("u/x.jpg")
        );
        assert_eq!(client.path_from_public_url("https://images.example.com/x.jpg"), None);
    }
}
