//! Mock `LiloClient` shared by unit tests.
#![cfg(test)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use lilo_client::{Account, LiloClient, LiloError, LocalSession, MoodQuery, NewMoodEntry};
use secrecy::SecretString;

/// Serves canned mood items, optionally failing the first calls with a status.
pub struct MockClient {
    items: Vec<serde_json::Value>,
    fail_first: u32,
    failure_status: u16,
    calls: AtomicU32,
    last_user: Mutex<Option<String>>,
}

impl MockClient {
    pub fn with_items(items: Vec<serde_json::Value>) -> Self {
        Self::failing_first(0, items)
    }

    /// Fail `n` calls with a 503 before serving `items`.
    pub fn failing_first(n: u32, items: Vec<serde_json::Value>) -> Self {
        Self {
            items,
            fail_first: n,
            failure_status: 503,
            calls: AtomicU32::new(0),
            last_user: Mutex::new(None),
        }
    }

    /// Fail every call with `status`.
    pub fn failing_with(status: u16) -> Self {
        Self {
            failure_status: status,
            ..Self::failing_first(u32::MAX, Vec::new())
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user(&self) -> Option<String> {
        self.last_user.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiloClient for MockClient {
    async fn list_moods(&self, query: &MoodQuery) -> Result<Vec<serde_json::Value>, LiloError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user.lock().unwrap() = query.user_id.clone();
        if call < self.fail_first {
            return Err(LiloError::from_status(self.failure_status, "mock failure".into()));
        }
        Ok(self.items.clone())
    }

    async fn create_mood(&self, entry: &NewMoodEntry) -> Result<serde_json::Value, LiloError> {
        let entry = entry.clone().validated()?;
        Ok(serde_json::json!({ "data": entry }))
    }

    async fn login_user(
        &self,
        _email: &str,
        _password: &SecretString,
    ) -> Result<Option<Account>, LiloError> {
        Ok(None)
    }

    async fn login_manager(
        &self,
        _email: &str,
        _password: &SecretString,
    ) -> Result<Option<Account>, LiloError> {
        Ok(None)
    }

    async fn list_managers(&self) -> Result<Vec<Account>, LiloError> {
        Ok(Vec::new())
    }

    async fn login_local(
        &self,
        _identifier: &str,
        _password: &SecretString,
    ) -> Result<LocalSession, LiloError> {
        Err(LiloError::Auth("mock has no accounts".into()))
    }
}
