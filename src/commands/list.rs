use anyhow::{Context, Result};
use serde::Serialize;

use crate::document::Document;
use crate::models::{ARTIFACTS, Artifact, TASKS, Task};

/// Everything a job declares, as parsed from its `<tasks>` and `<artifacts>`.
#[derive(Debug, Serialize)]
pub struct Listing {
    tasks: Vec<Task>,
    artifacts: Vec<Artifact>,
}

impl Listing {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}

pub fn run(document: &Document) -> Result<Listing> {
    let root = document.root();

    let tasks = root
        .find(TASKS)
        .into_iter()
        .flat_map(|container| container.elements())
        .enumerate()
        .map(|(index, element)| {
            Task::from_element(element).with_context(|| format!("Failed to read task #{}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let artifacts = root
        .find(ARTIFACTS)
        .into_iter()
        .flat_map(|container| container.elements())
        .enumerate()
        .map(|(index, element)| {
            Artifact::get_artifact_for(element)
                .with_context(|| format!("Failed to read artifact #{}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Listing { tasks, artifacts })
}
