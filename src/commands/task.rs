use anyhow::{Context, Result};

use crate::cli::FetchSourceArgs;
use crate::document::Document;
use crate::models::{
    Config, ExecTask, ExecTaskOptions, FetchArtifactDir, FetchArtifactFile, FetchArtifactOptions,
    FetchArtifactTask, RakeTask, RakeTaskOptions, RunIf, Task,
};

/// What `add-fetch` was asked to fetch and how.
#[derive(Debug)]
pub struct FetchRequest {
    pub pipeline: String,
    pub stage: String,
    pub job: String,
    pub srcfile: Option<String>,
    pub srcdir: Option<String>,
    pub artifact_id: Option<String>,
    pub config: Vec<(String, String)>,
    pub options: FetchArtifactOptions,
}

impl FetchRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pipeline: String,
        stage: String,
        job: String,
        source: FetchSourceArgs,
        config: Vec<(String, String)>,
        dest: Option<String>,
        origin: Option<String>,
        runif: RunIf,
    ) -> Self {
        Self {
            pipeline,
            stage,
            job,
            srcfile: source.srcfile,
            srcdir: source.srcdir,
            artifact_id: source.artifact_id,
            config,
            options: FetchArtifactOptions {
                dest,
                runif,
                origin,
                artifact_origin: None,
            },
        }
    }

    fn into_task(self) -> Result<FetchArtifactTask> {
        let Self {
            pipeline,
            stage,
            job,
            srcfile,
            srcdir,
            artifact_id,
            config,
            options,
        } = self;

        match (srcfile, srcdir, artifact_id) {
            (Some(file), None, None) => Ok(FetchArtifactTask::new(
                pipeline,
                stage,
                job,
                FetchArtifactFile::new(file),
                options,
            )?),
            (None, Some(dir), None) => Ok(FetchArtifactTask::new(
                pipeline,
                stage,
                job,
                FetchArtifactDir::new(dir),
                options,
            )?),
            (None, None, Some(artifact_id)) => {
                let config: Config = config.into_iter().collect();
                Ok(FetchArtifactTask::external(
                    pipeline,
                    stage,
                    job,
                    Some(artifact_id),
                    (!config.is_empty()).then_some(config),
                    options,
                ))
            }
            _ => anyhow::bail!("Exactly one of --srcfile, --srcdir or --artifact-id is required"),
        }
    }
}

pub fn add_exec(
    command_and_args: Vec<String>,
    working_dir: Option<String>,
    runif: RunIf,
    document: &mut Document,
) -> Result<Task> {
    let task = ExecTask::new(command_and_args, ExecTaskOptions { working_dir, runif })?;
    append(task.into(), document)
}

pub fn add_rake(target: String, runif: RunIf, document: &mut Document) -> Result<Task> {
    let task = RakeTask::new(target, RakeTaskOptions { runif });
    append(task.into(), document)
}

pub fn add_fetch(request: FetchRequest, document: &mut Document) -> Result<Task> {
    let task = request.into_task()?;
    append(task.into(), document)
}

fn append(task: Task, document: &mut Document) -> Result<Task> {
    let appended = task
        .append_to(document.root_mut())
        .with_context(|| format!("Failed to append {task}"))?;
    document.save()?;
    Ok(appended)
}
