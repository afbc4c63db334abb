use std::fmt;

use serde::Serialize;

use crate::dom::Element;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FetchArtifactFile(String);

impl FetchArtifactFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn as_xml_type_and_value(&self) -> (&'static str, &str) {
        ("srcfile", &self.0)
    }
}

impl fmt::Display for FetchArtifactFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FetchArtifactFile({:?})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FetchArtifactDir(String);

impl FetchArtifactDir {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn as_xml_type_and_value(&self) -> (&'static str, &str) {
        ("srcdir", &self.0)
    }
}

impl fmt::Display for FetchArtifactDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FetchArtifactDir({:?})", self.0)
    }
}

/// Where a path-based fetch reads from on the producing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum FetchArtifact {
    File(FetchArtifactFile),
    Dir(FetchArtifactDir),
}

impl FetchArtifact {
    pub fn path(&self) -> &str {
        match self {
            Self::File(file) => file.path(),
            Self::Dir(dir) => dir.path(),
        }
    }

    pub fn as_xml_type_and_value(&self) -> (&'static str, &str) {
        match self {
            Self::File(file) => file.as_xml_type_and_value(),
            Self::Dir(dir) => dir.as_xml_type_and_value(),
        }
    }
}

impl From<FetchArtifactFile> for FetchArtifact {
    fn from(file: FetchArtifactFile) -> Self {
        Self::File(file)
    }
}

impl From<FetchArtifactDir> for FetchArtifact {
    fn from(dir: FetchArtifactDir) -> Self {
        Self::Dir(dir)
    }
}

impl fmt::Display for FetchArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => fmt::Display::fmt(file, f),
            Self::Dir(dir) => fmt::Display::fmt(dir, f),
        }
    }
}

/// Picks the fetch source from the `srcfile` / `srcdir` attribute of a
/// `<fetchartifact>` element. Exactly one of them must be present.
pub fn fetch_artifact_src_from(element: &Element) -> Result<FetchArtifact> {
    match (element.attr("srcfile"), element.attr("srcdir")) {
        (Some(file), None) => Ok(FetchArtifactFile::new(file).into()),
        (None, Some(dir)) => Ok(FetchArtifactDir::new(dir).into()),
        _ => Err(Error::MalformedSource {
            element: element.describe(),
        }),
    }
}
