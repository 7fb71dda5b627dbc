//! `LiloClient` trait and the wire vocabulary shared with the content backend.

use async_trait::async_trait;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod retry;

#[derive(Debug, Error)]
pub enum LiloError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
}

impl LiloError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => LiloError::NotFound(body),
            401 | 403 => LiloError::Auth(body),
            400 | 422 => LiloError::InvalidInput(body),
            _ => LiloError::Api { status, body },
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LiloError::Http(e) => !e.is_builder() && !e.is_decode(),
            LiloError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One of the five mood levels, best first.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub enum Mood {
    #[serde(rename = "Super_Happy")]
    SuperHappy,
    Happy,
    Neutre,
    Depressed,
    #[serde(rename = "Super_Depressed")]
    SuperDepressed,
    #[serde(other)]
    Unknown,
}

impl Mood {
    /// Known levels in canonical order.
    pub const ALL: [Mood; 5] = [
        Mood::SuperHappy,
        Mood::Happy,
        Mood::Neutre,
        Mood::Depressed,
        Mood::SuperDepressed,
    ];

    /// Total mapping from a wire label; anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Super_Happy" => Mood::SuperHappy,
            "Happy" => Mood::Happy,
            "Neutre" => Mood::Neutre,
            "Depressed" => Mood::Depressed,
            "Super_Depressed" => Mood::SuperDepressed,
            _ => Mood::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::SuperHappy => "Super_Happy",
            Mood::Happy => "Happy",
            Mood::Neutre => "Neutre",
            Mood::Depressed => "Depressed",
            Mood::SuperDepressed => "Super_Depressed",
            Mood::Unknown => "Unknown",
        }
    }

    /// Chart scale: 5 for `Super_Happy` down to 1 for `Super_Depressed`, 0 otherwise.
    pub fn score(&self) -> u8 {
        match self {
            Mood::SuperHappy => 5,
            Mood::Happy => 4,
            Mood::Neutre => 3,
            Mood::Depressed => 2,
            Mood::SuperDepressed => 1,
            Mood::Unknown => 0,
        }
    }

    /// Position in [`Mood::ALL`], `None` for `Unknown`.
    pub fn index(&self) -> Option<usize> {
        Mood::ALL.iter().position(|m| m == self)
    }

    /// False only for `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Mood::Unknown)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body posted when a user records their day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NewMoodEntry {
    pub utilisateur: String,
    #[serde(rename = "Mood", skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(rename = "Emotion", default, skip_serializing_if = "Vec::is_empty")]
    pub emotions: Vec<String>,
    #[serde(rename = "Boisson", skip_serializing_if = "Option::is_none")]
    pub drink: Option<String>,
    #[serde(rename = "Journal", skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}

impl NewMoodEntry {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            utilisateur: user_id.into(),
            mood: None,
            emotions: Vec::new(),
            drink: None,
            journal: None,
        }
    }

    /// Trim the journal and reject entries that carry nothing to record.
    pub fn validated(mut self) -> Result<Self, LiloError> {
        if self.utilisateur.trim().is_empty() {
            return Err(LiloError::InvalidInput("missing owning user".into()));
        }
        if self.mood.is_some_and(|m| !m.is_known()) {
            return Err(LiloError::InvalidInput("unknown mood level".into()));
        }
        self.journal = self
            .journal
            .map(|j| j.trim().to_string())
            .filter(|j| !j.is_empty());
        self.drink = self.drink.filter(|d| !d.trim().is_empty());
        if self.mood.is_none()
            && self.emotions.is_empty()
            && self.drink.is_none()
            && self.journal.is_none()
        {
            return Err(LiloError::InvalidInput(
                "entry needs a mood, an emotion, a drink or a journal text".into(),
            ));
        }
        Ok(self)
    }
}

/// A user or manager row.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, JsonSchema)]
pub struct Account {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            #[serde(default, deserialize_with = "deserialize_opt_string")]
            id: Option<String>,
            #[serde(rename = "Nom", alias = "username")]
            name: Option<String>,
            #[serde(rename = "Mail", alias = "email")]
            email: Option<String>,
        }
        #[derive(Deserialize)]
        struct Row {
            #[serde(flatten)]
            fields: Fields,
            attributes: Option<Fields>,
        }

        let row = Row::deserialize(deserializer)?;
        let nested = row.attributes;
        let pick = |top: Option<String>, f: fn(&Fields) -> Option<String>| {
            top.or_else(|| nested.as_ref().and_then(f))
        };
        Ok(Account {
            id: pick(row.fields.id, |n| n.id.clone()),
            name: pick(row.fields.name, |n| n.name.clone()),
            email: pick(row.fields.email, |n| n.email.clone()),
        })
    }
}

pub(crate) fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// JWT and user returned by the backend's local sign-in.
#[derive(Clone, Debug)]
pub struct LocalSession {
    pub jwt: SecretString,
    pub user: Account,
}

/// Page size requested when walking the whole mood collection.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Filters for the mood collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoodQuery {
    pub user_id: Option<String>,
    pub page_size: Option<u32>,
}

impl MoodQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            page_size: None,
        }
    }
}

#[async_trait]
pub trait LiloClient: Send + Sync + 'static {
    /// Raw items of the mood collection, in backend order.
    async fn list_moods(&self, query: &MoodQuery) -> Result<Vec<serde_json::Value>, LiloError>;

    async fn create_mood(&self, entry: &NewMoodEntry) -> Result<serde_json::Value, LiloError>;

    /// Look a user up by credentials; `None` when nothing matches.
    async fn login_user(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Account>, LiloError>;

    /// Look a manager up by e-mail and check the password client-side.
    async fn login_manager(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Account>, LiloError>;

    async fn list_managers(&self) -> Result<Vec<Account>, LiloError>;

    /// Sign in through `auth/local`; the returned JWT can be used as bearer token.
    async fn login_local(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<LocalSession, LiloError>;
}
