use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use crate::dom::Element;
use crate::error::{Error, Result};

/// When a task runs, given the outcome of the tasks before it in the job.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunIf {
    #[default]
    Passed,
    Failed,
    Any,
}

impl RunIf {
    pub fn parse(value: &str) -> Result<Self> {
        value
            .parse()
            .map_err(|_| Error::InvalidRunCondition(value.to_owned()))
    }

    /// Reads the `<runif>` children of a task element.
    ///
    /// The server spells "any" as a `passed` + `failed` pair, so that pair is
    /// folded back into [`RunIf::Any`]. No children means the server default,
    /// `passed`. Every other multi-valued combination is rejected.
    pub fn from_element(element: &Element) -> Result<Self> {
        let statuses = element
            .find_all("runif")
            .map(|runif| runif.required_attr("status").map(str::to_owned))
            .collect::<Result<Vec<_>>>()?;

        match statuses.as_slice() {
            [] => Ok(Self::Passed),
            [status] => Self::parse(status),
            [first, second] if is_passed_failed_pair(first, second) => Ok(Self::Any),
            _ => Err(Error::AmbiguousRunCondition {
                values: statuses,
                element: element.describe(),
            }),
        }
    }

    pub(crate) fn to_element(self) -> Element {
        Element::new("runif").with_attr("status", self.as_ref())
    }
}

fn is_passed_failed_pair(first: &str, second: &str) -> bool {
    matches!((first, second), ("passed", "failed") | ("failed", "passed"))
}
