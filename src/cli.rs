use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::RunIf;

#[derive(Parser)]
#[command(name = "gt")]
#[command(about = "Read and write GoCD tasks and artifacts in pipeline config XML", long_about = None)]
pub struct Cli {
    /// Log parsing and serialization details to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Target GoCD server version (e.g. 18.3); overrides .gocd-tasks.toml
    #[arg(long, global = true, env = "GOCD_SERVER_VERSION")]
    pub server_version: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tasks and artifacts of a job
    List {
        /// XML file whose root element is the job
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append an exec task
    AddExec {
        /// XML file whose root element is the job
        file: PathBuf,

        /// Directory to run the command from
        #[arg(long)]
        working_dir: Option<String>,

        /// When to run: passed, failed or any
        #[arg(long, default_value = "passed", value_parser = RunIf::parse)]
        runif: RunIf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// The command followed by its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Append a rake task
    AddRake {
        /// XML file whose root element is the job
        file: PathBuf,

        /// The rake target to run
        target: String,

        /// When to run: passed, failed or any
        #[arg(long, default_value = "passed", value_parser = RunIf::parse)]
        runif: RunIf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a fetch-artifact task
    AddFetch {
        /// XML file whose root element is the job
        file: PathBuf,

        /// Pipeline that produced the artifact
        #[arg(long)]
        pipeline: String,

        /// Stage that produced the artifact
        #[arg(long)]
        stage: String,

        /// Job that produced the artifact
        #[arg(long)]
        job: String,

        #[command(flatten)]
        source: FetchSourceArgs,

        /// Plugin configuration for an external fetch (repeatable)
        #[arg(long = "config", value_name = "KEY=VALUE", value_parser = parse_key_value, requires = "artifact_id")]
        config: Vec<(String, String)>,

        /// Where to put the fetched file or directory
        #[arg(long, conflicts_with = "artifact_id")]
        dest: Option<String>,

        /// Origin hint
        #[arg(long)]
        origin: Option<String>,

        /// When to run: passed, failed or any
        #[arg(long, default_value = "passed", value_parser = RunIf::parse)]
        runif: RunIf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append an artifact declaration in the target server's format
    AddArtifact {
        /// XML file whose root element is the job
        file: PathBuf,

        #[command(flatten)]
        source: ArtifactSourceArgs,

        /// Destination path for a path artifact
        #[arg(long, conflicts_with = "id")]
        dest: Option<String>,

        /// Declare a test artifact instead of a build artifact
        #[arg(long, conflicts_with = "id")]
        test: bool,

        /// Artifact store for an external artifact
        #[arg(long, requires = "id")]
        store_id: Option<String>,

        /// Plugin configuration for an external artifact (repeatable)
        #[arg(long = "config", value_name = "KEY=VALUE", value_parser = parse_key_value, requires = "id")]
        config: Vec<(String, String)>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a job's artifacts in the target server's format
    Convert {
        /// XML file whose root element is the job
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct FetchSourceArgs {
    /// Fetch a single file
    #[arg(long)]
    pub srcfile: Option<String>,

    /// Fetch a directory
    #[arg(long)]
    pub srcdir: Option<String>,

    /// Fetch an external (plugin) artifact by id
    #[arg(long)]
    pub artifact_id: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ArtifactSourceArgs {
    /// Path of a build or test artifact
    #[arg(long)]
    pub src: Option<String>,

    /// Id of an external artifact
    #[arg(long)]
    pub id: Option<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
