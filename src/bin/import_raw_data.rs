use std::path::PathBuf;

use clap::Parser;
use viewgrid::{Dataset, DispatchOpts, ImportOpts, Progress, cli::ToolArgs};

/// Import raw captures into the canonical dataset layout.
///
/// Copies each raw image and reprojects each raw depth map, skipping files that already exist.
#[derive(Parser, Debug)]
#[command(name = "import_raw_data", version, allow_negative_numbers = true)]
struct Cli {
    /// Dataset parameter document.
    parameters: PathBuf,

    /// Densification method passed to the depth reprojection tool.
    densify_method: String,

    /// Depth camera intrinsics file.
    #[arg(long, default_value = viewgrid::DEFAULT_INTRINSICS)]
    intrinsics: PathBuf,

    /// Grid row to import on 2D datasets.
    #[arg(long, default_value_t = 0)]
    y: i32,

    /// Import every view of a 2D dataset instead of one row.
    #[arg(long, conflicts_with = "y")]
    full_grid: bool,

    /// Number of parallel jobs.
    #[arg(short, long, default_value_t = viewgrid::DEFAULT_THREADS)]
    jobs: usize,

    /// Run the jobs one after another.
    #[arg(long)]
    sequential: bool,

    /// Log the work that would be done without writing anything.
    #[arg(long)]
    dry_run: bool,

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
    let opts = ImportOpts {
        densify_method: cli.densify_method.clone(),
        intrinsics: cli.intrinsics.clone(),
        dry_run: cli.dry_run,
    };
    let dispatch_opts = DispatchOpts {
        parallel: !cli.sequential,
        threads: cli.jobs,
    };

    let items = if dataset.is_2d() && !cli.full_grid {
        dataset.row(cli.y)?
    } else {
        dataset.indices()
    };

    let progress = Progress::new(items.len());
    let stats = viewgrid::dispatch(&items, &dispatch_opts, &progress, |idx| {
        viewgrid::import_raw_view(&toolbox, &dataset, *idx, &opts).map(|_| ())
    })?;
    eprintln!("imported {} views", stats.succeeded);
    Ok(())
}
