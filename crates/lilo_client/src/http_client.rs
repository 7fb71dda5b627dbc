//! HTTP client implementation for the Lilo content backend.
//!
//! This module provides a reqwest-based implementation of the [`LiloClient`](crate::LiloClient) trait.

use crate::observability::{self, Outcome};
use crate::{Account, LiloClient, LiloError, LocalSession, MoodQuery, NewMoodEntry};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Client for the Lilo REST API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestLiloClient {
    base_url: String,
    api_token: Option<SecretString>,
    client: reqwest::Client,
}

impl ReqwestLiloClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The backend root (e.g., "http://localhost:1337"); `/api/...` is appended
    /// * `api_token` - Optional bearer token sent on every request
    pub fn new(base_url: &str, api_token: Option<SecretString>) -> Self {
        Self::with_timeout(base_url, api_token, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, api_token: Option<SecretString>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::with_timeout(&cfg.base_url, cfg.api_token.clone(), cfg.timeout)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, resource)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Build a GET request, authenticated when a token is configured.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Build a POST request, authenticated when a token is configured.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// Execute a request and decode the JSON body.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LiloError> {
        let resp = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                observability::record_request(endpoint, Outcome::Transport);
                return Err(e.into());
            }
        };
        let status = resp.status();
        if !status.is_success() {
            observability::record_request(endpoint, Outcome::Status(status.as_u16()));
            return Err(self.error_from_response(resp).await);
        }
        observability::record_request(endpoint, Outcome::Ok);
        // Read as text first so a shape mismatch reports what came back.
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(256).collect();
            LiloError::Decode(format!("{endpoint}: {e} - body: {body_snippet}"))
        })
    }

    /// Fetch a collection endpoint and return its `data` items.
    async fn fetch_collection(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<serde_json::Value>, LiloError> {
        self.fetch_page(endpoint, request).await.map(|(items, _)| items)
    }

    /// One page of a collection: its `data` items and `meta.pagination.pageCount`
    /// (1 when the backend sends no pagination block).
    async fn fetch_page(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(Vec<serde_json::Value>, u64), LiloError> {
        let payload: serde_json::Value = self.execute_json(endpoint, request).await?;
        let serde_json::Value::Object(mut obj) = payload else {
            return Err(LiloError::Decode(format!(
                "{endpoint}: unexpected payload shape, expected an object"
            )));
        };
        let page_count = obj
            .get("meta")
            .and_then(|m| m.get("pagination"))
            .and_then(|p| p.get("pageCount"))
            .and_then(|c| c.as_u64())
            .unwrap_or(1);
        match obj.remove("data") {
            Some(serde_json::Value::Array(items)) => Ok((items, page_count)),
            _ => Err(LiloError::Decode(format!(
                "{endpoint}: unexpected payload shape, missing `data` array"
            ))),
        }
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> LiloError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        tracing::warn!(status, body = %body_snippet, "backend returned an error status");
        LiloError::from_status(status, body_snippet)
    }

    /// Read the stored password of a raw manager row, flat or nested.
    fn stored_password(row: &serde_json::Value) -> Option<&str> {
        row.get("Mot_de_passe")
            .or_else(|| row.get("attributes").and_then(|a| a.get("Mot_de_passe")))
            .and_then(|v| v.as_str())
    }
}

#[async_trait]
impl LiloClient for ReqwestLiloClient {
    async fn list_moods(&self, query: &MoodQuery) -> Result<Vec<serde_json::Value>, LiloError> {
        let url = self.url("moods");
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(user) = query.user_id.as_deref() {
            pairs.push(("filters[utilisateur][$eq]", user.to_string()));
        }
        if let Some(size) = query.page_size {
            pairs.push(("pagination[pageSize]", size.to_string()));
        }
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();

        // Walk every page; the backend caps each response at its page size.
        let page_request = |page: u64| {
            let page = page.to_string();
            self.get_request(&url)
                .query(&qp)
                .query(&[("pagination[page]", page.as_str())])
        };
        let (mut items, page_count) = self.fetch_page("moods", page_request(1)).await?;
        for page in 2..=page_count {
            let (more, _) = self.fetch_page("moods", page_request(page)).await?;
            if more.is_empty() {
                break;
            }
            items.extend(more);
        }
        tracing::debug!(count = items.len(), pages = page_count, user = ?query.user_id, "fetched mood items");
        Ok(items)
    }

    async fn create_mood(&self, entry: &NewMoodEntry) -> Result<serde_json::Value, LiloError> {
        let entry = entry.clone().validated()?;
        let url = self.url("moods");
        let body = serde_json::json!({ "data": entry });
        let created: serde_json::Value = self
            .execute_json("create_mood", self.post_request(&url).json(&body))
            .await?;
        tracing::info!(user = %entry.utilisateur, "mood entry recorded");
        Ok(created)
    }

    async fn login_user(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Account>, LiloError> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(LiloError::InvalidInput("email and password are required".into()));
        }
        let url = self.url("utilisateurs");
        let qp = [
            ("filters[Mail][$eq]", email),
            ("filters[Mot_de_passe][$eq]", password.expose_secret()),
        ];
        let rows = self
            .fetch_collection("utilisateurs", self.get_request(&url).query(&qp))
            .await?;
        let Some(first) = rows.into_iter().next() else {
            return Ok(None);
        };
        serde_json::from_value::<Account>(first)
            .map(Some)
            .map_err(|e| LiloError::Decode(format!("utilisateurs: {e}")))
    }

    async fn login_manager(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Account>, LiloError> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(LiloError::InvalidInput("email and password are required".into()));
        }
        let url = self.url("managers");
        let rows = self
            .fetch_collection(
                "managers",
                self.get_request(&url).query(&[("filters[Mail][$eq]", email)]),
            )
            .await?;
        let Some(first) = rows.into_iter().next() else {
            return Ok(None);
        };
        if Self::stored_password(&first) != Some(password.expose_secret()) {
            return Err(LiloError::Auth("incorrect password".into()));
        }
        serde_json::from_value::<Account>(first)
            .map(Some)
            .map_err(|e| LiloError::Decode(format!("managers: {e}")))
    }

    async fn list_managers(&self) -> Result<Vec<Account>, LiloError> {
        let url = self.url("managers");
        let rows = self
            .fetch_collection("managers", self.get_request(&url))
            .await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value::<Account>(row)
                    .map_err(|e| LiloError::Decode(format!("managers: {e}")))
            })
            .collect()
    }

    async fn login_local(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<LocalSession, LiloError> {
        if identifier.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(LiloError::InvalidInput("identifier and password are required".into()));
        }
        let url = self.url("auth/local");
        let body = serde_json::json!({
            "identifier": identifier,
            "password": password.expose_secret(),
        });
        // Wrong credentials come back as 400.
        let mut payload: serde_json::Value = self
            .execute_json("auth_local", self.post_request(&url).json(&body))
            .await
            .map_err(|e| match e {
                LiloError::InvalidInput(msg) => LiloError::Auth(msg),
                other => other,
            })?;
        let jwt = payload
            .get("jwt")
            .and_then(|v| v.as_str())
            .map(|s| SecretString::new(s.into()))
            .ok_or_else(|| LiloError::Decode("auth_local: missing `jwt`".into()))?;
        let user = payload
            .get_mut("user")
            .map(serde_json::Value::take)
            .ok_or_else(|| LiloError::Decode("auth_local: missing `user`".into()))?;
        let user = serde_json::from_value::<Account>(user)
            .map_err(|e| LiloError::Decode(format!("auth_local: {e}")))?;
        tracing::info!(user = ?user.id, "signed in");
        Ok(LocalSession { jwt, user })
    }
}

#[cfg(test)]
mod tests {
    use crate::http_client::ReqwestLiloClient;
    use serde_json::json;

    #[tokio::test]
    async fn client_new_trims_trailing_slash() {
        let client = ReqwestLiloClient::new("http://localhost:1337/", None);
        assert_eq!(client.url("moods"), "http://localhost:1337/api/moods");
    }

    #[test]
    fn stored_password_reads_nested_rows() {
        let flat = json!({"Mot_de_passe": "pw"});
        let nested = json!({"attributes": {"Mot_de_passe": "pw2"}});
        assert_eq!(ReqwestLiloClient::stored_password(&flat), Some("pw"));
        assert_eq!(ReqwestLiloClient::stored_password(&nested), Some("pw2"));
        assert_eq!(ReqwestLiloClient::stored_password(&json!({})), None);
    }
}
