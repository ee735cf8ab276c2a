//! cli
//!
//! Command-line integration for the extraction engine.
//!
//! # Responsibilities
//!
//! - Parse flags and load configuration files
//! - Set up logging
//! - Honor `skip`
//! - Apply the `--unknown-on-error` fallback policy
//! - Publish the result through [`crate::ui::output`]
//!
//! # Architecture
//!
//! The CLI layer is thin. It resolves [`Parameters`] and hands them to
//! [`crate::engine::extract`]; it never touches the repository itself.

pub mod args;

pub use args::{Cli, OutputArg};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, Parameters};
use crate::engine::{self, ExtractionResult};
use crate::ui::output::{self, OutputFormat};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let loaded = Config::load(&cli.project_dir(), cli.config.as_deref())
        .context("failed to load configuration")?;
    let merged = loaded.config.layered(cli.config_layer());
    let (params, warnings) = Parameters::resolve(merged).context("invalid configuration")?;

    init_logging(params.verbose);
    if let Some(path) = loaded.config.global_config_loaded_from() {
        tracing::debug!(path = %path.display(), "global config loaded");
    }
    if let Some(path) = loaded.config.project_config_loaded_from() {
        tracing::debug!(path = %path.display(), "project config loaded");
    }
    for warning in loaded.warnings.iter().chain(&warnings) {
        tracing::warn!("{}", warning);
    }

    if params.skip {
        tracing::info!("skip is set, not extracting");
        return Ok(());
    }

    let result = match engine::extract(&params) {
        Ok(result) => result,
        Err(err) if cli.unknown_on_error => {
            tracing::warn!(error = %err, "extraction failed, publishing placeholders");
            ExtractionResult::placeholders()
        }
        Err(err) => return Err(err).context("failed to extract build number"),
    };

    match cli.field {
        Some(field) => output::print(result.get(field)),
        None => {
            let format = OutputFormat::from(cli.output);
            let rendered = output::render(&result, &params.namespace, format)
                .context("failed to render result")?;
            output::print(rendered);
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "git_buildnumber=debug"
    } else {
        "git_buildnumber=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
