use std::fmt;

use serde::Serialize;

use super::{RunIf, Task};
use crate::dom::Element;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RakeTaskOptions {
    pub runif: RunIf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RakeTask {
    target: String,
    runif: RunIf,
}

impl RakeTask {
    pub fn new(target: impl Into<String>, options: RakeTaskOptions) -> Self {
        Self {
            target: target.into(),
            runif: options.runif,
        }
    }

    pub(crate) fn from_element(element: &Element, runif: RunIf) -> Result<Self> {
        let target = element.required_attr("target")?;
        Ok(Self::new(target, RakeTaskOptions { runif }))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn runif(&self) -> RunIf {
        self.runif
    }

    pub fn append_to(&self, element: &mut Element) -> Result<Task> {
        let rake = Element::new("rake").with_attr("target", self.target.as_str());
        Task::attach(element, rake, self.runif)
    }
}

impl fmt::Display for RakeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RakeTask({:?}, \"{}\")", self.target, self.runif)
    }
}
