//! One generation run: resolve parameters, expand every marker, render the
//! artifact. Pure and synchronous once the skeleton is in memory; the only
//! side effect of a full run is the atomic emit in [`run`].

pub mod run;

pub use run::{
    run_check, run_generate, run_markers, CheckReport, GenerateRequest, GenerationReport,
};

use crate::error::GeneratorError;
use crate::expand::axis::AxisKind;
use crate::expand::{Expander, DEFAULT_MAX_INSTANTIATIONS};
use crate::params::GenerationParameters;
use crate::render::{render, RenderOptions};
use crate::skeleton::Skeleton;
use serde::Serialize;
use tracing::info;

/// Tunables of a run that are not generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub trailing_newline: bool,
    pub max_instantiations: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            trailing_newline: true,
            max_instantiations: DEFAULT_MAX_INSTANTIATIONS,
        }
    }
}

/// Fully rendered output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text: String,
    pub digest: String,
    pub markers: Vec<MarkerSummary>,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// BLAKE3 digest of artifact bytes, hex encoded.
pub fn artifact_digest(text: &str) -> String {
    bytes_digest(text.as_bytes())
}

/// Same digest over raw bytes, for destinations that may not be UTF-8.
pub fn bytes_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Expand and render `skeleton` for `params`.
pub fn generate(
    skeleton: &Skeleton,
    params: GenerationParameters,
    options: GenerateOptions,
) -> Result<Artifact, GeneratorError> {
    let expander = Expander::new(params).with_max_instantiations(options.max_instantiations);
    let expansion = expander.expand_all(skeleton)?;

    let text = render(
        skeleton,
        &expansion,
        RenderOptions {
            trailing_newline: options.trailing_newline,
        },
    )?;

    let markers = skeleton
        .markers()
        .map(|marker| {
            Ok(MarkerSummary {
                name: marker.name.clone(),
                axis: AxisKind::parse(&marker.name, &marker.axis)?,
                line: marker.line,
                instantiations: expansion.get(&marker.name).map_or(0, |i| i.len()),
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    let digest = artifact_digest(&text);
    info!(
        params = %params,
        markers = markers.len(),
        instantiations = expansion.total(),
        bytes = text.len(),
        digest = %digest,
        "Artifact rendered"
    );

    Ok(Artifact {
        text,
        digest,
        markers,
    })
}

/// Marker entry in reports, in skeleton declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerSummary {
    pub name: String,
    pub axis: AxisKind,
    pub line: usize,
    pub instantiations: usize,
}
