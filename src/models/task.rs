use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use super::{ExecTask, FetchArtifactTask, RakeTask, RunIf};
use crate::dom::Element;
use crate::error::{Error, Result};
use crate::helpers::find_similar;

/// Name of the container element tasks are appended to.
pub const TASKS: &str = "tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskKind {
    Exec,
    FetchArtifact,
    Rake,
}

type TaskParser = fn(&Element, RunIf) -> Result<Task>;

/// Tag name to parser. Anything not listed here is not a task we know.
const TASK_PARSERS: [(&str, TaskParser); 3] = [
    ("exec", |element, runif| {
        ExecTask::from_element(element, runif).map(Task::Exec)
    }),
    ("fetchartifact", |element, runif| {
        FetchArtifactTask::from_element(element, runif).map(Task::FetchArtifact)
    }),
    ("rake", |element, runif| {
        RakeTask::from_element(element, runif).map(Task::Rake)
    }),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Task {
    Exec(ExecTask),
    FetchArtifact(FetchArtifactTask),
    Rake(RakeTask),
}

impl Task {
    /// Builds the task described by a task element, dispatching on its tag.
    pub fn from_element(element: &Element) -> Result<Self> {
        let runif = RunIf::from_element(element)?;
        let tag = element.name();

        let (_, parse) = TASK_PARSERS
            .iter()
            .find(|(name, _)| *name == tag)
            .ok_or_else(|| Error::UnknownTaskType {
                tag: tag.to_owned(),
                suggestion: find_similar(tag, &TASK_PARSERS.map(|(name, _)| name))
                    .map(str::to_owned),
            })?;

        parse(element, runif)
    }

    /// Appends `task` (with its `<runif>`) under the `tasks` container of
    /// `parent`, creating the container if needed, and returns the task as
    /// read back from the inserted element.
    pub(crate) fn attach(parent: &mut Element, mut task: Element, runif: RunIf) -> Result<Self> {
        task.append(runif.to_element());
        let appended = parent.ensure_child(TASKS).append(task);
        let reparsed = Self::from_element(appended)?;
        debug!(kind = %reparsed.kind(), runif = %reparsed.runif(), "appended task");
        Ok(reparsed)
    }

    pub fn append_to(&self, parent: &mut Element) -> Result<Self> {
        match self {
            Self::Exec(task) => task.append_to(parent),
            Self::FetchArtifact(task) => task.append_to(parent),
            Self::Rake(task) => task.append_to(parent),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Exec(_) => TaskKind::Exec,
            Self::FetchArtifact(_) => TaskKind::FetchArtifact,
            Self::Rake(_) => TaskKind::Rake,
        }
    }

    pub fn runif(&self) -> RunIf {
        match self {
            Self::Exec(task) => task.runif(),
            Self::FetchArtifact(task) => task.runif(),
            Self::Rake(task) => task.runif(),
        }
    }
}

impl From<ExecTask> for Task {
    fn from(task: ExecTask) -> Self {
        Self::Exec(task)
    }
}

impl From<FetchArtifactTask> for Task {
    fn from(task: FetchArtifactTask) -> Self {
        Self::FetchArtifact(task)
    }
}

impl From<RakeTask> for Task {
    fn from(task: RakeTask) -> Self {
        Self::Rake(task)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec(task) => fmt::Display::fmt(task, f),
            Self::FetchArtifact(task) => fmt::Display::fmt(task, f),
            Self::Rake(task) => fmt::Display::fmt(task, f),
        }
    }
}
