//! Metadata resolution pipeline services

pub mod derive;
pub mod encora;
pub mod id_extractor;
pub mod metadata;
pub mod nfo;
pub mod stagemedia;
pub mod thumbs;
pub mod title;

pub use encora::EncoraClient;
pub use metadata::MetadataService;
pub use stagemedia::StageMediaClient;
pub use thumbs::{FfmpegThumbnailer, NoopThumbnailer, Thumbnailer};
