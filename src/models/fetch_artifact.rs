use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::fetch_source::{FetchArtifact, fetch_artifact_src_from};
use super::properties::{Config, configuration_element, fetch_properties_from};
use super::{RunIf, Task};
use crate::dom::Element;
use crate::error::{Error, Result};

/// `artifactOrigin` value that switches a fetch to a plugin-stored artifact.
pub const EXTERNAL_ORIGIN: &str = "external";

#[derive(Debug, Clone, Default)]
pub struct FetchArtifactOptions {
    pub dest: Option<String>,
    pub runif: RunIf,
    pub origin: Option<String>,
    pub artifact_origin: Option<String>,
}

/// Copies an artifact produced by another pipeline/stage/job into this job.
///
/// Path mode reads a file or directory (`src`). External mode, marked by
/// `artifact_origin == "external"`, fetches a plugin artifact by id instead
/// and carries the plugin's `config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchArtifactTask {
    pipeline: String,
    stage: String,
    job: String,
    src: Option<FetchArtifact>,
    dest: Option<String>,
    runif: RunIf,
    origin: Option<String>,
    artifact_origin: Option<String>,
    artifact_id: Option<String>,
    config: Config,
}

impl FetchArtifactTask {
    /// A fetch of a file or directory. `options.artifact_origin` may name any
    /// origin except `external`, which only [`FetchArtifactTask::external`]
    /// can build.
    pub fn new(
        pipeline: impl Into<String>,
        stage: impl Into<String>,
        job: impl Into<String>,
        src: impl Into<FetchArtifact>,
        options: FetchArtifactOptions,
    ) -> Result<Self> {
        let src = src.into();
        if options.artifact_origin.as_deref() == Some(EXTERNAL_ORIGIN) {
            return Err(Error::ExternalFetchWithSource(src.to_string()));
        }
        Ok(Self {
            pipeline: pipeline.into(),
            stage: stage.into(),
            job: job.into(),
            src: Some(src),
            dest: options.dest,
            runif: options.runif,
            origin: options.origin,
            artifact_origin: options.artifact_origin,
            artifact_id: None,
            config: Config::new(),
        })
    }

    /// A fetch of a plugin artifact. `dest` and `artifact_origin` in
    /// `options` are ignored: external fetches have no destination path and
    /// are always marked `external`.
    pub fn external(
        pipeline: impl Into<String>,
        stage: impl Into<String>,
        job: impl Into<String>,
        artifact_id: Option<String>,
        config: Option<Config>,
        options: FetchArtifactOptions,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            stage: stage.into(),
            job: job.into(),
            src: None,
            dest: None,
            runif: options.runif,
            origin: options.origin,
            artifact_origin: Some(EXTERNAL_ORIGIN.to_owned()),
            artifact_id,
            config: config.unwrap_or_default(),
        }
    }

    pub(crate) fn from_element(element: &Element, runif: RunIf) -> Result<Self> {
        let pipeline = element.required_attr("pipeline")?;
        let stage = element.required_attr("stage")?;
        let job = element.required_attr("job")?;
        let artifact_origin = element.attr("artifactOrigin").map(str::to_owned);
        let options = FetchArtifactOptions {
            dest: element.attr("dest").map(str::to_owned),
            runif,
            origin: element.attr("origin").map(str::to_owned),
            artifact_origin,
        };

        if options.artifact_origin.as_deref() == Some(EXTERNAL_ORIGIN) {
            if element.has_attr("srcfile") || element.has_attr("srcdir") {
                warn!(element = %element, "ignoring srcfile/srcdir on external fetchartifact");
            }
            return Ok(Self::external(
                pipeline,
                stage,
                job,
                element.attr("artifactId").map(str::to_owned),
                fetch_properties_from(element),
                options,
            ));
        }

        let src = fetch_artifact_src_from(element)?;
        Self::new(pipeline, stage, job, src, options)
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn src(&self) -> Option<&FetchArtifact> {
        self.src.as_ref()
    }

    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub fn runif(&self) -> RunIf {
        self.runif
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn artifact_origin(&self) -> Option<&str> {
        self.artifact_origin.as_deref()
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_external(&self) -> bool {
        self.artifact_origin.as_deref() == Some(EXTERNAL_ORIGIN)
    }

    pub fn append_to(&self, element: &mut Element) -> Result<Task> {
        let mut fetch = Element::new("fetchartifact")
            .with_attr("pipeline", self.pipeline.as_str())
            .with_attr("stage", self.stage.as_str())
            .with_attr("job", self.job.as_str());

        if self.is_external() {
            if let Some(artifact_id) = &self.artifact_id {
                fetch.set_attr("artifactId", artifact_id.as_str());
            }
            fetch.set_attr("artifactOrigin", EXTERNAL_ORIGIN);
            if let Some(origin) = &self.origin {
                fetch.set_attr("origin", origin.as_str());
            }
            fetch = fetch.with_child(configuration_element(&self.config));
        } else {
            if let Some(src) = &self.src {
                let (src_type, src_value) = src.as_xml_type_and_value();
                fetch.set_attr(src_type, src_value);
            }
            if let Some(dest) = &self.dest {
                fetch.set_attr("dest", dest.as_str());
            }
            if let Some(origin) = &self.origin {
                fetch.set_attr("origin", origin.as_str());
            }
            if let Some(artifact_origin) = &self.artifact_origin {
                fetch.set_attr("artifactOrigin", artifact_origin.as_str());
            }
        }

        Task::attach(element, fetch, self.runif)
    }
}

impl fmt::Display for FetchArtifactTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FetchArtifactTask({:?}, {:?}, {:?}",
            self.pipeline, self.stage, self.job
        )?;
        if self.is_external() {
            if let Some(artifact_id) = &self.artifact_id {
                write!(f, ", id={artifact_id:?}")?;
            }
            write!(f, ", config={:?}", self.config)?;
        } else if let Some(src) = &self.src {
            write!(f, ", {src}")?;
        }
        if let Some(dest) = &self.dest {
            write!(f, ", dest={dest:?}")?;
        }
        if self.runif != RunIf::Passed {
            write!(f, ", runif=\"{}\"", self.runif)?;
        }
        if let Some(origin) = &self.origin {
            write!(f, ", origin={origin:?}")?;
        }
        if let Some(artifact_origin) = &self.artifact_origin {
            write!(f, ", artifactOrigin={artifact_origin:?}")?;
        }
        f.write_str(")")
    }
}
