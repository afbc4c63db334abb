use anyhow::{Context, Result, bail};

use crate::cli::ArtifactSourceArgs;
use crate::document::Document;
use crate::models::{ARTIFACTS, Artifact, Config};
use crate::settings::ServerVersion;

/// What `add-artifact` was asked to declare.
#[derive(Debug)]
pub struct ArtifactRequest {
    pub src: Option<String>,
    pub dest: Option<String>,
    pub test: bool,
    pub id: Option<String>,
    pub store_id: Option<String>,
    pub config: Vec<(String, String)>,
}

impl ArtifactRequest {
    pub fn new(
        source: ArtifactSourceArgs,
        dest: Option<String>,
        test: bool,
        store_id: Option<String>,
        config: Vec<(String, String)>,
    ) -> Self {
        Self {
            src: source.src,
            dest,
            test,
            id: source.id,
            store_id,
            config,
        }
    }

    fn into_artifact(self) -> Result<Artifact> {
        match (self.src, self.id) {
            (Some(src), None) if self.test => Ok(Artifact::get_test_artifact(src, self.dest)),
            (Some(src), None) => Ok(Artifact::get_build_artifact(src, self.dest)),
            (None, Some(id)) => {
                let store_id = self
                    .store_id
                    .ok_or_else(|| anyhow::anyhow!("--store-id is required with --id"))?;
                let config: Config = self.config.into_iter().collect();
                Ok(Artifact::get_external_artifact(
                    id,
                    store_id,
                    (!config.is_empty()).then_some(config),
                ))
            }
            _ => bail!("Exactly one of --src or --id is required"),
        }
    }
}

pub fn add(
    request: ArtifactRequest,
    version: ServerVersion,
    document: &mut Document,
) -> Result<Artifact> {
    let artifact = request.into_artifact()?;
    let container = document.root_mut().ensure_child(ARTIFACTS);
    let appended = artifact
        .append_to(container, version.supports_artifact_types())
        .with_context(|| format!("Failed to append {artifact} for GoCD {version}"))?;
    document.save()?;
    Ok(appended)
}
