use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use super::properties::{Config, configuration_element, fetch_properties_from};
use crate::dom::Element;
use crate::error::{Error, Result};

/// Name of the container element artifacts live in.
pub const ARTIFACTS: &str = "artifacts";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactType {
    #[default]
    Build,
    Test,
    External,
}

impl ArtifactType {
    pub fn parse(value: &str) -> Result<Self> {
        value
            .parse()
            .map_err(|_| Error::UnknownArtifactType(value.to_owned()))
    }

    /// Name of the factory that produces artifacts of this type.
    pub fn constructor(self) -> &'static str {
        match self {
            Self::Build => "BuildArtifact",
            Self::Test => "TestArtifact",
            Self::External => "ExternalArtifact",
        }
    }
}

/// The two mutually exclusive ways an artifact names what it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArtifactSource {
    Path {
        src: String,
        dest: Option<String>,
    },
    Store {
        id: String,
        store_id: String,
        config: Option<Config>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    #[serde(flatten)]
    source: ArtifactSource,
    #[serde(rename = "type")]
    artifact_type: ArtifactType,
}

impl Artifact {
    pub fn get_build_artifact(src: impl Into<String>, dest: Option<String>) -> Self {
        Self::from_path(src.into(), dest, ArtifactType::Build)
    }

    pub fn get_test_artifact(src: impl Into<String>, dest: Option<String>) -> Self {
        Self::from_path(src.into(), dest, ArtifactType::Test)
    }

    pub fn get_external_artifact(
        id: impl Into<String>,
        store_id: impl Into<String>,
        config: Option<Config>,
    ) -> Self {
        Self {
            source: ArtifactSource::Store {
                id: id.into(),
                store_id: store_id.into(),
                config,
            },
            artifact_type: ArtifactType::External,
        }
    }

    fn from_path(src: String, dest: Option<String>, artifact_type: ArtifactType) -> Self {
        Self {
            source: ArtifactSource::Path { src, dest },
            artifact_type,
        }
    }

    /// Reads an `<artifact>` or `<test>` element.
    ///
    /// Elements written for servers before 18.3 carry no `type` attribute;
    /// their type follows from the tag instead.
    pub fn get_artifact_for(element: &Element) -> Result<Self> {
        let type_attribute = element.attr("type").map(ArtifactType::parse).transpose()?;

        if let Some(id) = element.attr("id") {
            return Ok(Self {
                source: ArtifactSource::Store {
                    id: id.to_owned(),
                    store_id: element.required_attr("storeId")?.to_owned(),
                    config: fetch_properties_from(element),
                },
                artifact_type: type_attribute.unwrap_or_default(),
            });
        }

        let artifact_type = type_attribute.unwrap_or(if element.name() == "artifact" {
            ArtifactType::Build
        } else {
            ArtifactType::Test
        });

        Ok(Self::from_path(
            element.required_attr("src")?.to_owned(),
            element.attr("dest").map(str::to_owned),
            artifact_type,
        ))
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    pub fn artifact_type(&self) -> ArtifactType {
        self.artifact_type
    }

    pub fn src(&self) -> Option<&str> {
        match &self.source {
            ArtifactSource::Path { src, .. } => Some(src),
            ArtifactSource::Store { .. } => None,
        }
    }

    pub fn dest(&self) -> Option<&str> {
        match &self.source {
            ArtifactSource::Path { dest, .. } => dest.as_deref(),
            ArtifactSource::Store { .. } => None,
        }
    }

    pub fn artifact_id(&self) -> Option<&str> {
        match &self.source {
            ArtifactSource::Store { id, .. } => Some(id),
            ArtifactSource::Path { .. } => None,
        }
    }

    pub fn store_id(&self) -> Option<&str> {
        match &self.source {
            ArtifactSource::Store { store_id, .. } => Some(store_id),
            ArtifactSource::Path { .. } => None,
        }
    }

    pub fn config(&self) -> Option<&Config> {
        match &self.source {
            ArtifactSource::Store { config, .. } => config.as_ref(),
            ArtifactSource::Path { .. } => None,
        }
    }

    /// Appends this artifact to `element` (normally a job's `<artifacts>`)
    /// in the shape the target server understands, then reads the new
    /// element back and returns what was read.
    pub fn append_to(&self, element: &mut Element, gocd_18_3_and_above: bool) -> Result<Self> {
        let new_element = if gocd_18_3_and_above {
            self.to_element_18_3_and_above()
        } else {
            self.to_element_18_2_and_below()?
        };

        let appended = Self::get_artifact_for(element.append(new_element))?;
        debug!(artifact = %appended, gocd_18_3_and_above, "appended artifact");
        Ok(appended)
    }

    fn to_element_18_3_and_above(&self) -> Element {
        match &self.source {
            ArtifactSource::Store {
                id,
                store_id,
                config,
            } => {
                let artifact = Element::new("artifact")
                    .with_attr("id", id.as_str())
                    .with_attr("storeId", store_id.as_str())
                    .with_attr("type", self.artifact_type.as_ref());
                match config {
                    Some(config) if !config.is_empty() => {
                        artifact.with_child(configuration_element(config))
                    }
                    _ => artifact,
                }
            }
            ArtifactSource::Path { src, dest } => {
                let mut artifact = Element::new("artifact").with_attr("src", src.as_str());
                if let Some(dest) = dest {
                    artifact.set_attr("dest", dest.as_str());
                }
                artifact.with_attr("type", self.artifact_type.as_ref())
            }
        }
    }

    fn to_element_18_2_and_below(&self) -> Result<Element> {
        let tag = match self.artifact_type {
            ArtifactType::Build => "artifact",
            ArtifactType::Test => "test",
            ArtifactType::External => {
                return Err(Error::UnsupportedVersionCombination(
                    self.artifact_type.to_string(),
                ));
            }
        };

        match &self.source {
            ArtifactSource::Path { src, dest } => {
                let mut artifact = Element::new(tag).with_attr("src", src.as_str());
                if let Some(dest) = dest {
                    artifact.set_attr("dest", dest.as_str());
                }
                Ok(artifact)
            }
            ArtifactSource::Store { store_id, .. } => Err(Error::UnsupportedVersionCombination(
                format!("{} (plugin store {store_id})", self.artifact_type),
            )),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructor = self.artifact_type.constructor();
        match &self.source {
            ArtifactSource::Store {
                id,
                store_id,
                config: None,
            } => write!(f, "{constructor}({id:?}, {store_id:?})"),
            ArtifactSource::Store {
                id,
                store_id,
                config: Some(config),
            } => write!(f, "{constructor}({id:?}, {store_id:?}, {config:?})"),
            ArtifactSource::Path { src, dest: None } => write!(f, "{constructor}({src:?})"),
            ArtifactSource::Path {
                src,
                dest: Some(dest),
            } => write!(f, "{constructor}({src:?}, {dest:?})"),
        }
    }
}
