mod artifact;
mod exec;
mod fetch_artifact;
mod fetch_source;
mod properties;
mod rake;
mod run_if;
mod task;

pub use artifact::{ARTIFACTS, Artifact, ArtifactSource, ArtifactType};
pub use exec::{ExecTask, ExecTaskOptions};
pub use fetch_artifact::{EXTERNAL_ORIGIN, FetchArtifactOptions, FetchArtifactTask};
pub use fetch_source::{FetchArtifact, FetchArtifactDir, FetchArtifactFile, fetch_artifact_src_from};
pub use properties::{Config, fetch_properties_from};
pub use rake::{RakeTask, RakeTaskOptions};
pub use run_if::RunIf;
pub use task::{TASKS, Task, TaskKind};
