use std::path::PathBuf;

use clap::Parser;
use viewgrid::{Dataset, SynthesisJob, ViewIndex, cli::ToolArgs};

/// Render a virtual view from a left and a right reference view.
///
/// View indices use the canonical form: `x` on 1D datasets, `x,y` on 2D datasets. A 2D index
/// with a negative x (`-1,0`) must follow `--`.
#[derive(Parser, Debug)]
#[command(name = "run_vsrs", version, allow_negative_numbers = true)]
struct Cli {
    /// Renderer binary.
    renderer: PathBuf,

    /// Dataset parameter document.
    parameters: PathBuf,

    /// Left reference view.
    left: ViewIndex,

    /// View to render.
    #[arg(value_name = "VIRTUAL")]
    virtual_idx: ViewIndex,

    /// Right reference view.
    right: ViewIndex,

    /// Output image.
    output: PathBuf,

    /// Renderer camera file; exported from the dataset cameras when omitted.
    cameras: Option<PathBuf>,

    #[command(flatten)]
    tools: ToolArgs,

    /// Log per-step decisions.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli: Cli = viewgrid::cli::parse_args();
    viewgrid::cli::init_tracing(cli.verbose);

    let dataset = Dataset::open(&cli.parameters)?;
    let toolbox = cli.tools.toolbox()?;
    let job = SynthesisJob {
        renderer: cli.renderer,
        left: cli.left,
        virtual_idx: cli.virtual_idx,
        right: cli.right,
        output: cli.output,
        cameras: cli.cameras,
    };

    viewgrid::synthesize(&toolbox, &dataset, &job).map_err(viewgrid::cli::log_failure)?;
    eprintln!("wrote {}", job.output.display());
    Ok(())
}
