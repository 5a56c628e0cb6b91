//! Generation entry points used by the CLI: generate, check, markers.
//! Each resolves parameters first, so invalid input fails before the
//! skeleton is read or anything is written.

use super::{bytes_digest, generate, Artifact, GenerateOptions, MarkerSummary};
use crate::emit::emit_artifact;
use crate::error::GeneratorError;
use crate::params::{self, GenerationParameters};
use crate::skeleton::Skeleton;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Raw inputs of one run, as gathered by a caller.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub skeleton: PathBuf,
    pub output: PathBuf,
    pub type_count: Option<i64>,
    pub visitor_arity: Option<i64>,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub skeleton: PathBuf,
    pub destination: PathBuf,
    pub params: GenerationParameters,
    pub markers: Vec<MarkerSummary>,
    pub instantiations: usize,
    pub bytes: usize,
    pub digest: String,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub destination: PathBuf,
    pub params: GenerationParameters,
    pub expected_digest: String,
    /// Digest of the current destination content; `None` when it is missing.
    pub actual_digest: Option<String>,
    pub up_to_date: bool,
}

fn render_request(request: &GenerateRequest) -> Result<(GenerationParameters, Artifact), GeneratorError> {
    let params = params::resolve(request.type_count, request.visitor_arity)?;
    let skeleton = Skeleton::load(&request.skeleton)?;
    let artifact = generate(&skeleton, params, request.options)?;
    Ok((params, artifact))
}

/// Full run: resolve, read, expand, render, atomically write.
pub fn run_generate(request: &GenerateRequest) -> Result<GenerationReport, GeneratorError> {
    info!(
        skeleton = %request.skeleton.display(),
        output = %request.output.display(),
        "Generation started"
    );
    let (params, artifact) = render_request(request)?;
    let outcome = emit_artifact(&request.output, &artifact.text)?;

    info!(
        destination = %request.output.display(),
        bytes = outcome.bytes_written,
        changed = outcome.changed,
        "Generation finished"
    );

    Ok(GenerationReport {
        skeleton: request.skeleton.clone(),
        destination: request.output.clone(),
        params,
        instantiations: artifact.markers.iter().map(|m| m.instantiations).sum(),
        markers: artifact.markers,
        bytes: outcome.bytes_written,
        digest: artifact.digest,
        changed: outcome.changed,
    })
}

/// Render in memory and compare with the destination. Never writes.
pub fn run_check(request: &GenerateRequest) -> Result<CheckReport, GeneratorError> {
    let (params, artifact) = render_request(request)?;

    let actual_digest = match std::fs::read(&request.output) {
        Ok(existing) => Some(bytes_digest(&existing)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(GeneratorError::io(&request.output, e)),
    };
    let up_to_date = actual_digest.as_deref() == Some(artifact.digest.as_str());
    if !up_to_date {
        warn!(destination = %request.output.display(), "Destination is stale or missing");
    }

    Ok(CheckReport {
        destination: request.output.clone(),
        params,
        expected_digest: artifact.digest,
        actual_digest,
        up_to_date,
    })
}

/// Marker table of a skeleton with the instantiation count each marker
/// expands to under the given parameters.
pub fn run_markers(request: &GenerateRequest) -> Result<Vec<MarkerSummary>, GeneratorError> {
    let (_, artifact) = render_request(request)?;
    Ok(artifact.markers)
}
