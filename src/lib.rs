//! Metadata resolver for stage-recording media libraries
//!
//! Resolves descriptive metadata (title, cast, genres, images, subtitles,
//! rating) for a recording identified by a filesystem path. The pipeline
//! extracts an Encora recording id from the path or sidecar marker files,
//! fetches the recording from the Encora API, enriches it with StageMedia
//! poster/headshot images and subtitle downloads, and falls back to a local
//! NFO sidecar when the remote lookup is unavailable.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::ResolverConfig;
pub use error::FetchError;
pub use models::{PersonInfo, PersonKind, ResolvedMetadata};
pub use services::metadata::MetadataService;
