use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Three-state patch value for partial updates that survives serialization round-trips.
/// Unlike `Option<Option<T>>`, each variant has a distinct wire representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Field was not included in the request (no change).
    #[default]
    Absent,
    /// Field was explicitly set to null (clear it).
    Null,
    /// Field was set to a new value.
    Value(T),
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(v: Option<Option<T>>) -> Self {
        match v {
            None => Patch::Absent,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Value(v),
        }
    }
}

impl<T> Patch<T> {
    /// Convert to the `Option<Option<&T>>` form that storage operations expect.
    pub fn as_option(&self) -> Option<Option<&T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

/// A catalog entry stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub version: String,
    /// Public URL of the release artifact
    pub file_url: String,
    /// Artifact size in bytes
    pub file_size: u64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub download_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub author_id: String,
}

/// A user profile stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

/// Credentials for a sign-in subject. Shares its id with the profile row;
/// keyed in redb by the lowercased email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub email: String,
    pub password_hash: String,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
}

/// A bearer session stored under its token digest. The token itself is
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Color scheme preference persisted per profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

/// Catalog-wide totals for the admin overview
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub total_software: u64,
    pub total_downloads: u64,
    pub total_categories: u64,
    /// Entries created inside the recent-uploads window
    pub recent_uploads: u64,
}

/// Per-day activity tallies. Downloads are attributed to the day the entry
/// was created since individual download events are not recorded.
#[derive(Debug, Clone)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub uploads: u64,
    pub downloads: u64,
}
