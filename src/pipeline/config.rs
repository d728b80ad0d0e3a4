use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

use crate::{
    dataset::model::Dataset,
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::ViewIndex,
};

/// Key of the `vsrs` clause entry whose members are copied verbatim into the config.
pub const PASSTHROUGH_KEY: &str = "config";
pub const OUTPUT_KEY: &str = "OutputVirtualViewImageName";

/// Renderer configuration: ordered `Key  Value` lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RendererConfig {
    entries: Vec<(String, String)>,
}

impl RendererConfig {
    /// Builds the configuration for rendering `virtual_idx` from `left` and `right`.
    ///
    /// Reference textures and depth maps come from the `vsrs` clause of each reference view.
    /// Optional `z_near`/`z_far` and the `vsrs.config` object are taken from the `vsrs` clause
    /// of the virtual view.
    pub fn build(
        dataset: &Dataset,
        cameras: &Path,
        left: ViewIndex,
        virtual_idx: ViewIndex,
        right: ViewIndex,
        output: &Path,
    ) -> ViewgridResult<Self> {
        let (width, height) = dataset.image_size()?;
        let left_view = dataset.view(left)?;
        let right_view = dataset.view(right)?;
        let virtual_view = dataset.view(virtual_idx)?;
        let left_vsrs = left_view.vsrs()?;
        let right_vsrs = right_view.vsrs()?;
        let virtual_vsrs = virtual_view.vsrs()?;

        let mut cfg = Self::default();
        cfg.set("DepthType", 1);
        cfg.set("SourceWidth", width);
        cfg.set("SourceHeight", height);
        cfg.set("StartFrame", 0);
        cfg.set("TotalNumberOfFrames", 1);

        let z_near = virtual_vsrs.number_param("z_near")?;
        let z_far = virtual_vsrs.number_param("z_far")?;
        for side in ["Left", "Right"] {
            if let Some(z) = z_near {
                cfg.set(format!("{side}NearestDepthValue"), z);
            }
            if let Some(z) = z_far {
                cfg.set(format!("{side}FarthestDepthValue"), z);
            }
        }

        cfg.set("CameraParameterFile", cameras.display());
        cfg.set("LeftCameraName", left_view.camera_name()?);
        cfg.set("VirtualCameraName", virtual_view.camera_name()?);
        cfg.set("RightCameraName", right_view.camera_name()?);
        cfg.set("LeftViewImageName", left_vsrs.image_filename()?.display());
        cfg.set("RightViewImageName", right_vsrs.image_filename()?.display());
        cfg.set("LeftDepthMapName", left_vsrs.depth_filename()?.display());
        cfg.set("RightDepthMapName", right_vsrs.depth_filename()?.display());
        cfg.set(OUTPUT_KEY, output.display());

        cfg.set("ColorSpace", 0);
        cfg.set("Precision", 2);
        cfg.set("Filter", 1);
        cfg.set("BoundaryNoiseRemoval", 0);
        cfg.set("SynthesisMode", 0);

        if let Some(extra) = virtual_vsrs.parameters().get(PASSTHROUGH_KEY) {
            let extra = extra.as_object().ok_or_else(|| {
                ViewgridError::parameters(format!("'vsrs.{PASSTHROUGH_KEY}' must be an object"))
            })?;
            for (key, value) in extra {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => u8::from(*b).to_string(),
                    _ => {
                        return Err(ViewgridError::parameters(format!(
                            "'vsrs.{PASSTHROUGH_KEY}.{key}' must be a scalar"
                        )));
                    }
                };
                if key == OUTPUT_KEY {
                    continue;
                }
                cfg.set(key.as_str(), text);
            }
        }
        Ok(cfg)
    }

    /// Sets `key`, replacing an existing entry in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl std::fmt::Display) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k:<39} {v}\n"))
            .collect()
    }

    pub fn write_to(&self, path: &Path) -> ViewgridResult<()> {
        std::fs::write(path, self.to_text())
            .with_context(|| format!("write renderer config '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
