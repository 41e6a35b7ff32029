//! REST API access for the idea board.
//!
//! Layers, bottom up:
//! - `Transport` / `HttpTransport`: sends an `Operation`, returns a `Response`
//! - `RequestAugmenter`: stamps the stored access token as a bearer header
//! - `RefreshCoordinator`: single-flight token refresh and one-shot replay
//! - `IdeaClient`: typed endpoints on top of the coordinator

pub mod augment;
pub mod client;
pub mod error;
pub mod operation;
pub mod refresh;
pub mod transport;

pub use augment::RequestAugmenter;
pub use client::IdeaClient;
pub use error::ApiError;
pub use operation::{Body, FilePart, Operation, Outcome, Response};
pub use refresh::{RefreshCoordinator, RefreshError, RefreshSettings};
pub use transport::{HttpTransport, Transport};
