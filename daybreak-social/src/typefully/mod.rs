//! Typefully v2 API integration surface.
//!
//! Submodules provide the HTTP client wrapper and strongly typed request and
//! response models. The client deals in social-set-scoped endpoints only;
//! team-level endpoints are not used by the pipeline.
pub mod client;
pub mod types;

pub use client::TypefullyClient;
pub use types::MediaReadiness;
