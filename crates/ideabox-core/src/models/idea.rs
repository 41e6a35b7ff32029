//! Idea board domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used by the backend (`2024-05-01 13:45`).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

/// Entry in the idea list; content is already shortened by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaSummary {
    pub id: i64,
    pub title: String,
    pub content_summary: String,
    pub author: String,
    pub created_at: String,
    pub image_url: Option<String>,
}

impl IdeaSummary {
    pub fn created(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub image_url: Option<String>,
}

impl IdeaDetail {
    pub fn created(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdea {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
}

/// Answer to an image upload: the name the server stored the file under.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

/// Server-side draft, at most one per user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}
