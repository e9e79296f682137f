//! PostgREST record endpoints

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use super::{read_json, send, Op, SupabaseClient};
use crate::domain::{DomainError, DomainResult, NewTodo, Todo, TodoId, TodoPatch, UserId};
use crate::repository::traits::RecordStore;

const RETURN_REPRESENTATION: &str = "return=representation";

impl SupabaseClient {
    /// `/rest/v1/<table>` with the given filters appended.
    pub(crate) fn table_url(&self, filters: &[(&str, String)]) -> DomainResult<Url> {
        let mut url = self.endpoint(&format!("rest/v1/{}", self.table))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn rows(&self, method: Method, url: Url, body: Option<serde_json::Value>) -> DomainResult<Vec<Todo>> {
        let token = self.access_token().await?;
        let mut request = self.request(method, url, token.as_deref()).header("Prefer", RETURN_REPRESENTATION);
        if let Some(body) = body {
            request = request.json(&body);
        }
        read_json(Op::Records, send(request).await?).await
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn to_body<T: serde::Serialize>(value: &T) -> DomainResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| DomainError::Store(format!("cannot encode request: {}", e)))
}

#[async_trait(?Send)]
impl RecordStore for SupabaseClient {
    async fn select(&self, owner: &UserId) -> DomainResult<Vec<Todo>> {
        let url = self.table_url(&[
            ("select", "*".to_string()),
            ("user_id", eq(owner)),
            ("order", "created_at.desc".to_string()),
        ])?;
        self.rows(Method::GET, url, None).await
    }

    async fn find_by_id(&self, id: &TodoId) -> DomainResult<Option<Todo>> {
        let url = self.table_url(&[("select", "*".to_string()), ("id", eq(id))])?;
        Ok(self.rows(Method::GET, url, None).await?.into_iter().next())
    }

    async fn insert(&self, draft: &NewTodo) -> DomainResult<Todo> {
        let url = self.table_url(&[("select", "*".to_string())])?;
        self.rows(Method::POST, url, Some(to_body(draft)?))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Store("insert returned no row".to_string()))
    }

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo> {
        let url = self.table_url(&[("id", eq(id)), ("select", "*".to_string())])?;
        self.rows(Method::PATCH, url, Some(to_body(patch)?))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("todo {}", id)))
    }

    async fn delete(&self, id: &TodoId) -> DomainResult<Option<Todo>> {
        let url = self.table_url(&[("id", eq(id)), ("select", "*".to_string())])?;
        Ok(self.rows(Method::DELETE, url, None).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::rest::tests::client;

    #[test]
    fn test_owner_filtered_select_url() {
        let url = client()
            .table_url(&[
                ("select", "*".to_string()),
                ("user_id", eq(UserId::new("u-1"))),
                ("order", "created_at.desc".to_string()),
            ])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/rest/v1/todos?select=*&user_id=eq.u-1&order=created_at.desc"
        );
    }

    #[test]
    fn test_patch_body_only_carries_changed_fields() {
        let patch = TodoPatch { status: Some(crate::domain::Status::Done), ..TodoPatch::default() };
        assert_eq!(to_body(&patch).unwrap(), serde_json::json!({ "status": "done" }));
    }
}
