//! Data models for the idea board API.
//!
//! - `IdeaSummary`, `IdeaDetail`, `NewIdea`, `UploadResponse`: published ideas
//! - `Draft`: the per-user cloud draft
//! - Auth bodies: `LoginRequest`, `RegisterRequest`, `TokenResponse`

pub mod auth;
pub mod idea;

pub use auth::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse};
pub use idea::{Draft, IdeaDetail, IdeaSummary, NewIdea, UploadResponse};
