//! viewgrid manages multi-view camera-grid datasets and drives the external tools that derive
//! new data from them.
//!
//! A dataset is a JSON parameter document describing a grid of camera positions `(x, y)`.
//! Every view inherits the global parameters and may override them locally; filename
//! patterns are partial templates that can be resolved one axis at a time.
//!
//! # Pipelines
//!
//! - **Slice**: fix `y` and emit a 1D parameter document ([`slice_parameters`]).
//! - **Raw import**: copy raw captures and reproject their depth maps into the canonical
//!   layout ([`import_raw_view`]).
//! - **View synthesis**: export reference views, write a renderer config, run the renderer
//!   and convert its output into an image ([`synthesize`]).
//!
//! Batches of per-view jobs run through [`dispatch()`], sequentially or on a worker pool.
//! All subprocesses go through [`Toolbox`], and all temporaries are [`TempPath`]s removed on
//! every exit path.
#![forbid(unsafe_code)]

mod dataset;
mod dispatch;
mod foundation;
mod pipeline;
mod template;
mod tools;

/// Shared plumbing for the `slice`, `import_raw_data` and `run_vsrs` binaries.
pub mod cli;

pub use dataset::model::{Dataset, ParameterSet};
pub use dataset::slice::{slice_file, slice_parameters, write_parameters};
pub use dataset::view::{KINECT_RAW_CLAUSE, VSRS_CLAUSE, View};
pub use dispatch::{DEFAULT_THREADS, DispatchOpts, DispatchStats, Progress, dispatch};
pub use foundation::error::{ViewgridError, ViewgridResult};
pub use foundation::index::{IndexRange, ViewIndex};
pub use pipeline::config::RendererConfig;
pub use pipeline::import::{DEFAULT_INTRINSICS, ImportOpts, ImportOutcome, import_raw_view};
pub use pipeline::synthesis::{ExportOutcome, SynthesisJob, export_reference, synthesize};
pub use template::engine::{
    Bindings, TemplateValue, bindings, instantiate, placeholder_names, render,
};
pub use template::spec::FormatSpec;
pub use tools::invoke::{ToolOutput, ToolSettings, Toolbox, ensure_parent_dir};
pub use tools::temp::TempPath;
