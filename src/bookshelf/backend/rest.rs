use super::ShelfBackend;
use crate::error::{Result, ShelfError};
use crate::model::{BookRecord, Profile, ReadingStats, ShelfCounts, StatusChange};
use crate::session::User;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a hosted PostgREST/GoTrue backend.
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

/// What a successful password sign-in hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthGrant {
    pub access_token: String,
    pub user: User,
}

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
    completed_at: Option<String>,
}

#[derive(Serialize)]
struct StatsPatch {
    total_books_to_read: usize,
    total_books_read: usize,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Act on behalf of a signed-in user instead of the anonymous role.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    /// A request against `table`. Query values are percent-encoded by reqwest.
    fn table_request(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
    ) -> RequestBuilder {
        self.authorize(self.client.request(method, self.table_url(table)).query(query))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        debug!(%table, ?query, "GET");
        let response = self.table_request(Method::GET, table, query).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn patch_rows<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<serde_json::Value>> {
        debug!(%table, ?query, "PATCH");
        let response = self
            .table_request(Method::PATCH, table, query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<serde_json::Value>>().await?)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthGrant> {
        let url = self.auth_url("token");
        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        let response = check_status(response)
            .await
            .map_err(|e| ShelfError::Auth(e.to_string()))?;
        Ok(response.json::<AuthGrant>().await?)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = self.auth_url("logout");
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(response)
            .await
            .map_err(|e| ShelfError::Auth(e.to_string()))?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ShelfError::Api(format!("{}: {}", status, body)))
}

/// PostgREST equality filter value for a query parameter.
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn select_all() -> (&'static str, String) {
    ("select", "*".to_string())
}

#[async_trait]
impl ShelfBackend for RestBackend {
    async fn list_books(&self) -> Result<Vec<BookRecord>> {
        let query = [select_all(), ("order", "added_at.desc".to_string())];
        self.fetch_rows("books", &query)
            .await
            .map_err(|e| ShelfError::Query(e.to_string()))
    }

    async fn update_book_status(&self, id: &str, change: &StatusChange) -> Result<()> {
        let query = [("id", eq(id))];
        let patch = StatusPatch {
            status: change.status.container_id(),
            completed_at: change.completed_at.map(|t| t.to_rfc3339()),
        };
        let rows = self
            .patch_rows("books", &query, &patch)
            .await
            .map_err(|e| ShelfError::Update(e.to_string()))?;
        if rows.is_empty() {
            // PostgREST answers 200 with no rows when the filter matched nothing
            // the caller is allowed to see.
            return Err(ShelfError::Update(format!(
                "book {} does not exist or is not writable",
                id
            )));
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let query = [select_all(), ("id", eq(user_id))];
        let rows: Vec<Profile> = self
            .fetch_rows("profiles", &query)
            .await
            .map_err(|e| ShelfError::Query(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<ReadingStats>> {
        let query = [select_all(), ("user_id", eq(user_id))];
        let rows: Vec<ReadingStats> = self
            .fetch_rows("reading_stats", &query)
            .await
            .map_err(|e| ShelfError::Query(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    async fn update_stats(&self, user_id: &str, counts: ShelfCounts) -> Result<()> {
        let query = [("user_id", eq(user_id))];
        let patch = StatsPatch {
            total_books_to_read: counts.to_read,
            total_books_read: counts.completed,
        };
        let rows = self
            .patch_rows("reading_stats", &query, &patch)
            .await
            .map_err(|e| ShelfError::StatsUpdate(e.to_string()))?;
        if rows.is_empty() {
            warn!(%user_id, "no reading_stats row to update");
        }
        Ok(())
    }
}
