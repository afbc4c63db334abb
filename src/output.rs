use anyhow::Result;
use console::{Term, style};
use serde::Serialize;

use crate::commands::list::Listing;
use crate::models::{Artifact, Task};
use crate::settings::ServerVersion;

const WRAP_WIDTH: usize = 100;

pub struct Output {
    term: Term,
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            json,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.term.write_line(&output)?;
        Ok(())
    }

    /// Writes a developer-readable form, wrapping long ones under the bullet.
    fn write_item(&self, item: &str) -> Result<()> {
        let options = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("  - ")
            .subsequent_indent("      ");
        for line in textwrap::wrap(item, options) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    pub fn listing(&self, listing: &Listing) -> Result<()> {
        if self.json {
            return self.print_json(listing);
        }

        self.term.write_line(&format!(
            "{} ({})",
            style("Tasks").bold(),
            listing.tasks().len()
        ))?;
        if listing.tasks().is_empty() {
            self.term.write_line("  No tasks found.")?;
        }
        for task in listing.tasks() {
            self.write_item(&task.to_string())?;
        }

        self.term.write_line("")?;
        self.term.write_line(&format!(
            "{} ({})",
            style("Artifacts").bold(),
            listing.artifacts().len()
        ))?;
        if listing.artifacts().is_empty() {
            self.term.write_line("  No artifacts found.")?;
        }
        for artifact in listing.artifacts() {
            self.write_item(&artifact.to_string())?;
        }
        Ok(())
    }

    pub fn task_added(&self, task: &Task) -> Result<()> {
        if self.json {
            return self.print_json(task);
        }

        self.term.write_line(&format!(
            "{} {}",
            style("Added task:").green(),
            style(task.kind().as_ref()).cyan().bold()
        ))?;
        self.write_item(&task.to_string())?;
        self.term.write_line(&format!(
            "  Runs if: {}",
            style(task.runif().as_ref()).yellow()
        ))?;
        Ok(())
    }

    pub fn artifact_added(&self, artifact: &Artifact, version: ServerVersion) -> Result<()> {
        if self.json {
            return self.print_json(artifact);
        }

        self.term.write_line(&format!(
            "{} {} {}",
            style("Added artifact:").green(),
            style(artifact.artifact_type().as_ref()).cyan().bold(),
            style(format!("(GoCD {version})")).dim()
        ))?;
        self.write_item(&artifact.to_string())?;
        Ok(())
    }

    pub fn converted(&self, artifacts: &[Artifact], version: ServerVersion) -> Result<()> {
        if self.json {
            return self.print_json(artifacts);
        }

        if artifacts.is_empty() {
            self.term.write_line("No artifacts to convert.")?;
            return Ok(());
        }

        self.term.write_line(&format!(
            "{} {} artifact(s) for GoCD {}",
            style("Converted").green(),
            artifacts.len(),
            style(version).cyan().bold()
        ))?;
        for artifact in artifacts {
            self.write_item(&artifact.to_string())?;
        }
        Ok(())
    }
}
