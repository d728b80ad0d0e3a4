use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    dataset::model::Dataset,
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::ViewIndex,
    pipeline::DEPTH_REPROJECTION_TOOL,
    tools::{
        invoke::{Toolbox, ensure_parent_dir},
        temp::TempPath,
    },
};

pub const DEFAULT_INTRINSICS: &str = "../data/kinect_internal_intrinsics.json";
/// Mask argument telling the reprojection tool not to write a mask.
pub const NO_MASK: &str = "-";

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImportOpts {
    /// Densification method passed through to the reprojection tool.
    pub densify_method: String,
    /// Depth camera intrinsics file.
    pub intrinsics: PathBuf,
    /// Log what would be done without touching the filesystem.
    pub dry_run: bool,
}

impl ImportOpts {
    pub fn new(densify_method: impl Into<String>) -> Self {
        Self {
            densify_method: densify_method.into(),
            intrinsics: PathBuf::from(DEFAULT_INTRINSICS),
            dry_run: false,
        }
    }
}

/// Work performed by one import call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub copied_image: bool,
    pub reprojected_depth: bool,
}

impl ImportOutcome {
    pub fn did_work(self) -> bool {
        self.copied_image || self.reprojected_depth
    }
}

/// Brings the raw capture of `idx` (its `kinect_raw` clause) into the canonical layout.
///
/// The image is copied and the depth map reprojected, each only when the canonical file is
/// missing, so a second run performs no work.
#[tracing::instrument(skip(toolbox, dataset, opts), fields(view = %idx))]
pub fn import_raw_view(
    toolbox: &Toolbox,
    dataset: &Dataset,
    idx: ViewIndex,
    opts: &ImportOpts,
) -> ViewgridResult<ImportOutcome> {
    let view = dataset.view(idx)?;
    let raw = view.kinect_raw()?;
    let mut outcome = ImportOutcome::default();

    let image = view.image_filename()?;
    if image.exists() {
        tracing::debug!(path = %image.display(), "image exists, skipping copy");
    } else {
        let source = raw.image_filename()?;
        require_input(&source)?;
        if opts.dry_run {
            tracing::info!(from = %source.display(), to = %image.display(), "would copy image");
        } else {
            ensure_parent_dir(&image)?;
            // Staged, so a failed copy never leaves a partial canonical image behind.
            let extension = image.extension().and_then(OsStr::to_str).unwrap_or("tmp");
            let staged = TempPath::beside(&image, extension)?;
            std::fs::copy(&source, staged.path()).with_context(|| {
                format!("copy '{}' to '{}'", source.display(), image.display())
            })?;
            staged.persist(&image)?;
            outcome.copied_image = true;
        }
    }

    let depth = view.depth_filename()?;
    if depth.exists() {
        tracing::debug!(path = %depth.display(), "depth exists, skipping reprojection");
        return Ok(outcome);
    }
    let source = raw.depth_filename()?;
    require_input(&source)?;
    let mask = view.mask_filename()?;
    if opts.dry_run {
        tracing::info!(from = %source.display(), to = %depth.display(), "would reproject depth");
        return Ok(outcome);
    }

    ensure_parent_dir(&depth)?;
    if let Some(mask) = &mask {
        ensure_parent_dir(mask)?;
    }
    let args: [OsString; 5] = [
        source.into(),
        depth.clone().into(),
        mask.map_or_else(|| NO_MASK.into(), PathBuf::into_os_string),
        opts.intrinsics.clone().into(),
        OsStr::new(&opts.densify_method).to_os_string(),
    ];
    toolbox.call_tool(DEPTH_REPROJECTION_TOOL, &args, Some(&depth))?;
    outcome.reprojected_depth = true;
    Ok(outcome)
}

fn require_input(path: &Path) -> ViewgridResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ViewgridError::parameters(format!(
            "raw input '{}' does not exist",
            path.display()
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/import.rs"]
mod tests;
