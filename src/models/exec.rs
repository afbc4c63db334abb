use std::fmt;

use serde::Serialize;

use super::{RunIf, Task};
use crate::dom::Element;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ExecTaskOptions {
    pub working_dir: Option<String>,
    pub runif: RunIf,
}

/// Runs a command with arguments, optionally from a working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecTask {
    command: String,
    args: Vec<String>,
    working_dir: Option<String>,
    runif: RunIf,
}

impl ExecTask {
    /// The first entry of `command_and_args` is the executable; the rest are
    /// passed as separate arguments and must not be empty.
    pub fn new<I, S>(command_and_args: I, options: ExecTaskOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command_and_args = command_and_args.into_iter().map(Into::into);
        let command = command_and_args.next().ok_or(Error::EmptyCommand)?;
        let args: Vec<String> = command_and_args.collect();
        if let Some(index) = args.iter().position(String::is_empty) {
            return Err(Error::EmptyArgument(index + 1));
        }
        Ok(Self {
            command,
            args,
            working_dir: options.working_dir,
            runif: options.runif,
        })
    }

    pub(crate) fn from_element(element: &Element, runif: RunIf) -> Result<Self> {
        let command = element.required_attr("command")?;
        let args = element.find_all("arg").filter_map(Element::text);
        let options = ExecTaskOptions {
            working_dir: element.attr("workingdir").map(str::to_owned),
            runif,
        };
        Self::new(std::iter::once(command.to_owned()).chain(args), options)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn command_and_args(&self) -> Vec<&str> {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.working_dir.as_deref()
    }

    pub fn runif(&self) -> RunIf {
        self.runif
    }

    pub fn append_to(&self, element: &mut Element) -> Result<Task> {
        let mut exec = Element::new("exec").with_attr("command", self.command.as_str());
        if let Some(working_dir) = &self.working_dir {
            exec.set_attr("workingdir", working_dir.as_str());
        }
        for arg in &self.args {
            exec = exec.with_child(Element::new("arg").with_text(arg));
        }
        Task::attach(element, exec, self.runif)
    }
}

impl fmt::Display for ExecTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecTask({:?}", self.command_and_args())?;
        if let Some(working_dir) = &self.working_dir {
            write!(f, ", working_dir={working_dir:?}")?;
        }
        if self.runif != RunIf::Passed {
            write!(f, ", runif=\"{}\"", self.runif)?;
        }
        f.write_str(")")
    }
}
