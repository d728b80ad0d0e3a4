use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use crate::{
    dataset::model::Dataset,
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::ViewIndex,
    pipeline::{
        CAMERA_EXPORT_TOOL, EXPORT_DEPTH_TOOL, EXPORT_TEXTURE_TOOL, PIXEL_FORMAT, YUV_IMPORT_TOOL,
        config::RendererConfig,
    },
    tools::{
        invoke::{Toolbox, ensure_parent_dir},
        temp::TempPath,
    },
};

/// Files the renderer drops into its working directory on every run.
pub const RENDERER_BYPRODUCTS: [&str; 3] = ["5.bmp", "6.bmp", "7.bmp"];

/// One virtual-view rendering request.
#[derive(Clone, Debug)]
pub struct SynthesisJob {
    /// Renderer binary, run with the config path as its only argument.
    pub renderer: PathBuf,
    pub left: ViewIndex,
    pub virtual_idx: ViewIndex,
    pub right: ViewIndex,
    pub output: PathBuf,
    /// Renderer camera file; exported from the dataset cameras when `None`.
    pub cameras: Option<PathBuf>,
}

/// Which reference files an export call actually produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportOutcome {
    pub texture: bool,
    pub depth: bool,
}

/// Exports the canonical image/depth of `idx` into the `vsrs` clause files.
///
/// Existing targets are never overwritten.
pub fn export_reference(
    toolbox: &Toolbox,
    dataset: &Dataset,
    idx: ViewIndex,
) -> ViewgridResult<ExportOutcome> {
    let view = dataset.view(idx)?;
    let vsrs = view.vsrs()?;
    let mut outcome = ExportOutcome::default();

    let texture = vsrs.image_filename()?;
    if texture.exists() {
        tracing::debug!(view = %idx, path = %texture.display(), "texture export exists, skipping");
    } else {
        let source = view.image_filename()?;
        ensure_parent_dir(&texture)?;
        toolbox.call_tool(
            EXPORT_TEXTURE_TOOL,
            [source.as_os_str(), texture.as_os_str(), OsStr::new(PIXEL_FORMAT)],
            Some(&texture),
        )?;
        outcome.texture = true;
    }

    let depth = vsrs.depth_filename()?;
    if depth.exists() {
        tracing::debug!(view = %idx, path = %depth.display(), "depth export exists, skipping");
    } else {
        let source = view.depth_filename()?;
        ensure_parent_dir(&depth)?;
        toolbox.call_tool(
            EXPORT_DEPTH_TOOL,
            [source.as_os_str(), depth.as_os_str()],
            Some(&depth),
        )?;
        outcome.depth = true;
    }
    Ok(outcome)
}

/// Renders `job.virtual_idx` from its two references into `job.output`.
///
/// On success `job.output` holds a readable image. On failure a previously existing output is
/// left untouched, and every temporary created here is removed before returning.
#[tracing::instrument(skip(toolbox, dataset, job), fields(virtual_idx = %job.virtual_idx))]
pub fn synthesize(toolbox: &Toolbox, dataset: &Dataset, job: &SynthesisJob) -> ViewgridResult<()> {
    for idx in [job.left, job.virtual_idx, job.right] {
        dataset.check_index(idx)?;
    }
    let (width, height) = dataset.image_size()?;

    export_reference(toolbox, dataset, job.left)?;
    export_reference(toolbox, dataset, job.right)?;

    let exported_cameras;
    let cameras: &Path = match &job.cameras {
        Some(path) => path.as_path(),
        None => {
            let tmp = toolbox.temp("txt")?;
            let source = dataset.cameras_filename()?;
            toolbox.call_tool(
                CAMERA_EXPORT_TOOL,
                [source.as_os_str(), tmp.path().as_os_str()],
                Some(tmp.path()),
            )?;
            exported_cameras = tmp;
            exported_cameras.path()
        }
    };

    let rendered = toolbox.temp("yuv")?;
    let config_file = TempPath::create(toolbox.settings().scratch_dir(), "txt")?;
    RendererConfig::build(
        dataset,
        cameras,
        job.left,
        job.virtual_idx,
        job.right,
        rendered.path(),
    )?
    .write_to(config_file.path())?;

    let render = toolbox.run(
        "renderer",
        &job.renderer,
        [config_file.path()],
        Some(rendered.path()),
    );
    remove_byproducts();
    if let Err(e) = render {
        let err = match e {
            ViewgridError::ExternalToolFailed { reason, output, .. } => {
                ViewgridError::RendererFailed {
                    virtual_idx: job.virtual_idx.encode(),
                    output: if output.trim().is_empty() {
                        reason
                    } else {
                        output
                    },
                }
            }
            other => other,
        };
        return Err(err);
    }

    ensure_parent_dir(&job.output)?;
    let staged = TempPath::beside(&job.output, "png")?;
    let args: [OsString; 5] = [
        rendered.path().into(),
        staged.path().into(),
        width.to_string().into(),
        height.to_string().into(),
        PIXEL_FORMAT.into(),
    ];
    toolbox.call_tool(YUV_IMPORT_TOOL, &args, Some(staged.path()))?;

    let dims = image::image_dimensions(staged.path()).map_err(|e| {
        ViewgridError::tool_failed(
            YUV_IMPORT_TOOL,
            format!("produced an unreadable image: {e}"),
            "",
        )
    })?;
    if dims != (width, height) {
        return Err(ViewgridError::tool_failed(
            YUV_IMPORT_TOOL,
            format!(
                "produced a {}x{} image, expected {width}x{height}",
                dims.0, dims.1
            ),
            "",
        ));
    }
    staged.persist(&job.output)?;
    tracing::info!(output = %job.output.display(), "rendered virtual view");
    Ok(())
}

fn remove_byproducts() {
    for name in RENDERER_BYPRODUCTS {
        match std::fs::remove_file(name) {
            Ok(()) => tracing::debug!(file = name, "removed renderer byproduct"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(file = name, error = %e, "could not remove renderer byproduct")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/synthesis.rs"]
mod tests;
