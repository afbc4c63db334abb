use anyhow::{Context, Result};

use crate::document::Document;
use crate::dom::Element;
use crate::models::{ARTIFACTS, Artifact};
use crate::settings::ServerVersion;

/// Re-serializes every artifact of the job for `version`. The file is only
/// rewritten when all of them convert.
pub fn run(version: ServerVersion, document: &mut Document) -> Result<Vec<Artifact>> {
    let Some(container) = document.root().find(ARTIFACTS) else {
        return Ok(Vec::new());
    };

    let artifacts = container
        .elements()
        .map(Artifact::get_artifact_for)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read artifacts of {}", document.path().display()))?;

    let mut replacement = Element::new(ARTIFACTS);
    let converted = artifacts
        .iter()
        .map(|artifact| artifact.append_to(&mut replacement, version.supports_artifact_types()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to convert artifacts for GoCD {version}"))?;

    *document.root_mut().ensure_child(ARTIFACTS) = replacement;
    document.save()?;
    Ok(converted)
}
