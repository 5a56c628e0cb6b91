//! Varigen: Deterministic Variant Header Generation
//!
//! Expands an annotated skeleton into the full text of a tagged-union header
//! supporting a bounded number of alternative types and a bounded number of
//! `visit` arguments. Parameters are resolved, every marker is expanded along
//! its axis, the artifact is rendered and then written atomically.

pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod expand;
pub mod generation;
pub mod logging;
pub mod params;
pub mod render;
pub mod skeleton;

pub use error::GeneratorError;
pub use generation::{generate, Artifact, GenerateOptions};
pub use params::GenerationParameters;
pub use skeleton::Skeleton;
