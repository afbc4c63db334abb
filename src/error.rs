use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected exactly one of srcfile or srcdir. Do not know what src type to use for {element}")]
    MalformedSource { element: String },

    #[error("Don't know task type {tag}{}", did_you_mean(.suggestion))]
    UnknownTaskType {
        tag: String,
        suggestion: Option<String>,
    },

    #[error("Unknown artifact type {0}")]
    UnknownArtifactType(String),

    #[error("Cannot create task with runif=\"{0}\" - it must be one of passed, failed, any")]
    InvalidRunCondition(String),

    #[error("Don't know what multiple runif values ({}) means in {element}", .values.join(", "))]
    AmbiguousRunCondition {
        values: Vec<String>,
        element: String,
    },

    #[error("Artifact type '{0}' not supported in GoCD 18.2 and below")]
    UnsupportedVersionCombination(String),

    #[error("<{tag}> is missing required attribute '{attribute}': {element}")]
    MissingAttribute {
        tag: String,
        attribute: &'static str,
        element: String,
    },

    #[error("An exec task needs at least a command")]
    EmptyCommand,

    #[error("Argument #{0} of an exec task is empty; <arg/> without text is skipped when read")]
    EmptyArgument(usize),

    #[error("A fetch with artifactOrigin=\"external\" takes an artifact id, not {0}")]
    ExternalFetchWithSource(String),

    #[error("Invalid server version '{0}', expected MAJOR.MINOR")]
    InvalidServerVersion(String),

    #[error("XML document has no root element")]
    EmptyDocument,

    #[error("XML parse error: {0}")]
    XmlRead(#[from] xml::reader::Error),

    #[error("XML write error: {0}")]
    XmlWrite(#[from] std::io::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!("\nDid you mean: {s}"))
        .unwrap_or_default()
}
