//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Every configuration option has a flag of the same name in kebab case.
//! Flags that are not given leave the config file values in place.

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::ConfigFile;
use crate::engine::Field;
use crate::ui::output::OutputFormat;

/// Derive a build number from the state of a git repository
#[derive(Parser, Debug)]
#[command(name = "git-buildnumber")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Publish all fields as properties
    git-buildnumber

    # Only the build number, counting commits since the last release
    git-buildnumber --count-commits-since-exclusive v1.0 --field buildNumber

    # Custom format with the embedded engine
    git-buildnumber --build-number-format 'tag + \"-\" + commitsCount'

    # Never fail the build, publish UNKNOWN_* values instead
    git-buildnumber --unknown-on-error --output gradle")]
pub struct Cli {
    /// Directory inside the repository (default: current directory)
    #[arg(long, short = 'C', value_name = "PATH")]
    pub repository_directory: Option<PathBuf>,

    /// Project config file (default: buildnumber.toml in the repository directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prefix for published property names
    #[arg(long)]
    pub namespace: Option<String>,

    /// Value of the dirty field when the working tree is dirty
    #[arg(long)]
    pub dirty_value: Option<String>,

    /// Length of shortRevision and shortParent (0-40)
    #[arg(long, allow_negative_numbers = true)]
    pub short_revision_length: Option<i64>,

    /// Pattern for authorDate and commitDate, e.g. yyyy-MM-dd
    #[arg(long, value_name = "PATTERN")]
    pub git_date_format: Option<String>,

    /// Pattern for buildDate, e.g. yyyy-MM-dd HH:mm:ss
    #[arg(long, value_name = "PATTERN")]
    pub build_date_format: Option<String>,

    /// Time zone for both date patterns: UTC, GMT+2, +05:30, Europe/Berlin
    #[arg(long, value_name = "ZONE")]
    pub date_format_time_zone: Option<String>,

    /// Count commits back to this tag or commit, counting it
    #[arg(long, value_name = "REF")]
    pub count_commits_since_inclusive: Option<String>,

    /// Count commits back to this tag or commit, not counting it
    #[arg(long, value_name = "REF")]
    pub count_commits_since_exclusive: Option<String>,

    /// Expression producing buildNumber; every field is a variable
    #[arg(long, value_name = "EXPR")]
    pub build_number_format: Option<String>,

    /// Evaluator for --build-number-format
    #[arg(long, value_parser = ["rhai", "command", "disabled"])]
    pub format_engine: Option<String>,

    /// Program and arguments for the command engine, comma separated (default: sh,-c)
    #[arg(long, value_name = "ARGS", value_delimiter = ',')]
    pub format_command: Vec<String>,

    /// Do nothing and print nothing
    #[arg(long)]
    pub skip: bool,

    /// Log parameters, timings and every field to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Output shape
    #[arg(long, value_enum, default_value_t = OutputArg::Properties)]
    pub output: OutputArg,

    /// Print UNKNOWN_* placeholders instead of failing when extraction fails
    #[arg(long)]
    pub unknown_on_error: bool,

    /// Print only this field's value
    #[arg(long, value_name = "NAME")]
    pub field: Option<Field>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The configuration layer given on the command line.
    pub fn config_layer(&self) -> ConfigFile {
        ConfigFile {
            namespace: self.namespace.clone(),
            dirty_value: self.dirty_value.clone(),
            short_revision_length: self.short_revision_length,
            git_date_format: self.git_date_format.clone(),
            build_date_format: self.build_date_format.clone(),
            date_format_time_zone: self.date_format_time_zone.clone(),
            count_commits_since_inclusive: self.count_commits_since_inclusive.clone(),
            count_commits_since_exclusive: self.count_commits_since_exclusive.clone(),
            build_number_format: self.build_number_format.clone(),
            format_engine: self.format_engine.clone(),
            format_command: (!self.format_command.is_empty()).then(|| self.format_command.clone()),
            repository_directory: self.repository_directory.clone(),
            skip: self.skip.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }

    /// Where to look for the repository and the project config file.
    pub fn project_dir(&self) -> PathBuf {
        self.repository_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Output shape
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputArg {
    /// namespace.field=value
    #[default]
    Properties,
    /// namespaceField=value
    Gradle,
    /// JSON object keyed by field name
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Properties => OutputFormat::Properties,
            OutputArg::Gradle => OutputFormat::Gradle,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}
