use std::{path::PathBuf, time::Duration};

use clap::{Parser, error::ErrorKind};

use crate::{
    foundation::error::{ViewgridError, ViewgridResult},
    tools::invoke::{ToolSettings, Toolbox},
};

/// External tool options shared by the binaries that run tools.
#[derive(clap::Args, Clone, Debug)]
pub struct ToolArgs {
    /// Directory the tool ids (e.g. `kinect/depth_reprojection`) resolve against.
    #[arg(long, env = "VIEWGRID_TOOLS_DIR", default_value = ".")]
    pub tools_dir: PathBuf,

    /// Directory for temporary files (defaults to the system temp dir).
    #[arg(long, env = "VIEWGRID_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Kill external tools running longer than this many seconds.
    #[arg(long, env = "VIEWGRID_TOOL_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl ToolArgs {
    pub fn settings(&self) -> ToolSettings {
        ToolSettings {
            tools_dir: self.tools_dir.clone(),
            scratch_dir: self.scratch_dir.clone(),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }

    pub fn toolbox(&self) -> ViewgridResult<Toolbox> {
        Toolbox::new(self.settings())
    }
}

/// Exit code for an argument error: 0 for `--help`/`--version`, 1 otherwise.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parses the process arguments, printing the usage and exiting 1 on misuse.
pub fn parse_args<P: Parser>() -> P {
    match P::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    }
}

/// Logs the subprocess output carried by `err` and hands the error back.
pub fn log_failure(err: ViewgridError) -> ViewgridError {
    if let Some(output) = err.captured_output()
        && !output.trim().is_empty()
    {
        tracing::error!("captured output:\n{output}");
    }
    err
}

/// Installs the stderr `tracing` subscriber; `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
