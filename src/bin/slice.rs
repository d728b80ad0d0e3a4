use std::path::PathBuf;

use clap::Parser;

/// Project a 2D dataset onto one row of its grid.
#[derive(Parser, Debug)]
#[command(name = "slice", version, allow_negative_numbers = true)]
struct Cli {
    /// Input parameter document.
    in_parameters: PathBuf,

    /// Grid row to keep.
    y: i32,

    /// Output parameter document.
    out_parameters: PathBuf,

    /// Log per-step decisions.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli: Cli = viewgrid::cli::parse_args();
    viewgrid::cli::init_tracing(cli.verbose);

    viewgrid::slice_file(&cli.in_parameters, cli.y, &cli.out_parameters)?;
    eprintln!("wrote {}", cli.out_parameters.display());
    Ok(())
}
