use std::path::PathBuf;

use serde_json::Value;

use crate::{
    dataset::model::{Dataset, ParameterSet, VIEWS_KEY, number_param, string_param},
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::ViewIndex,
    template::engine::{Bindings, TemplateValue, render},
};

pub const VSRS_CLAUSE: &str = "vsrs";
pub const KINECT_RAW_CLAUSE: &str = "kinect_raw";

pub const IMAGE_FORMAT_KEY: &str = "image_filename_format";
pub const DEPTH_FORMAT_KEY: &str = "depth_filename_format";
pub const MASK_FORMAT_KEY: &str = "mask_filename_format";
pub const CAMERA_NAME_KEY: &str = "camera_name_format";

/// Read-only projection of a [`Dataset`] at one grid position.
///
/// The main view sees the global parameters overlaid by the view's local overrides. A clause
/// view (e.g. `vsrs`, `kinect_raw`) sees only the named clause object, again overlaid by the
/// matching clause inside the overrides. Filenames are derived on demand and never stored.
#[derive(Clone, Debug)]
pub struct View<'a> {
    dataset: &'a Dataset,
    index: ViewIndex,
    clause: Option<String>,
    parameters: ParameterSet,
}

impl<'a> View<'a> {
    pub(crate) fn new(dataset: &'a Dataset, index: ViewIndex) -> Self {
        let mut parameters = dataset.parameters().clone();
        parameters.remove(VIEWS_KEY);
        if let Some(local) = dataset.overrides(index) {
            overlay(&mut parameters, local);
        }
        Self {
            dataset,
            index,
            clause: None,
            parameters,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn index(&self) -> ViewIndex {
        self.index
    }

    /// Name of the clause this view projects, `None` for the main view.
    pub fn clause_name(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn into_parameters(self) -> ParameterSet {
        self.parameters
    }

    pub fn string_param(&self, key: &str) -> ViewgridResult<Option<&str>> {
        string_param(&self.parameters, key)
    }

    pub fn number_param(&self, key: &str) -> ViewgridResult<Option<f64>> {
        number_param(&self.parameters, key)
    }

    /// View of the named parameter clause at the same index.
    pub fn clause(&self, name: &str) -> ViewgridResult<View<'a>> {
        let mut parameters = self
            .dataset
            .parameters()
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                ViewgridError::parameters(format!("no clause '{name}' in parameters"))
            })?;
        if let Some(local) = self
            .dataset
            .overrides(self.index)
            .and_then(|o| o.get(name))
            .and_then(Value::as_object)
        {
            overlay(&mut parameters, local);
        }
        Ok(View {
            dataset: self.dataset,
            index: self.index,
            clause: Some(name.to_string()),
            parameters,
        })
    }

    pub fn vsrs(&self) -> ViewgridResult<View<'a>> {
        self.clause(VSRS_CLAUSE)
    }

    pub fn kinect_raw(&self) -> ViewgridResult<View<'a>> {
        self.clause(KINECT_RAW_CLAUSE)
    }

    /// x as used in this namespace's filenames: `trunc(x * x_index_factor) + x_index_offset`.
    pub fn local_x(&self) -> ViewgridResult<i64> {
        self.local_axis("x", self.index.x)
    }

    /// y as used in this namespace's filenames; `None` for a 1d index.
    pub fn local_y(&self) -> ViewgridResult<Option<i64>> {
        self.index.y.map(|y| self.local_axis("y", y)).transpose()
    }

    fn local_axis(&self, axis: &str, raw: i32) -> ViewgridResult<i64> {
        local_axis_value(&self.parameters, axis, raw)
    }

    fn raw_bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("x".into(), TemplateValue::from(self.index.x));
        if let Some(y) = self.index.y {
            b.insert("y".into(), TemplateValue::from(y));
        }
        b
    }

    fn local_bindings(&self) -> ViewgridResult<Bindings> {
        let mut b = Bindings::new();
        b.insert("x".into(), TemplateValue::Int(self.local_x()?));
        if let Some(y) = self.local_y()? {
            b.insert("y".into(), TemplateValue::Int(y));
        }
        Ok(b)
    }

    /// Formats a name template with the raw grid indices.
    pub fn format_name(&self, tpl: &str) -> ViewgridResult<String> {
        render(tpl, &self.raw_bindings())
    }

    /// Formats a filename template with the local axis values, relative to the dataset root.
    pub fn format_filename(&self, tpl: &str) -> ViewgridResult<PathBuf> {
        let rel = render(tpl, &self.local_bindings()?)?;
        Ok(self.dataset.filepath(rel))
    }

    /// Filename from an optional `*_filename_format` parameter.
    pub fn local_filename(&self, key: &str) -> ViewgridResult<Option<PathBuf>> {
        self.string_param(key)?
            .map(|tpl| self.format_filename(tpl))
            .transpose()
    }

    fn required_filename(&self, key: &str) -> ViewgridResult<PathBuf> {
        self.local_filename(key)?.ok_or_else(|| {
            let scope = self.clause.as_deref().unwrap_or("dataset");
            ViewgridError::parameters(format!("missing '{key}' in {scope} parameters"))
        })
    }

    pub fn image_filename(&self) -> ViewgridResult<PathBuf> {
        self.required_filename(IMAGE_FORMAT_KEY)
    }

    pub fn depth_filename(&self) -> ViewgridResult<PathBuf> {
        self.required_filename(DEPTH_FORMAT_KEY)
    }

    pub fn mask_filename(&self) -> ViewgridResult<Option<PathBuf>> {
        self.local_filename(MASK_FORMAT_KEY)
    }

    /// Camera name from `camera_name_format`; clause views fall back to the global format.
    pub fn camera_name(&self) -> ViewgridResult<String> {
        let tpl = match self.string_param(CAMERA_NAME_KEY)? {
            Some(tpl) => tpl,
            None => string_param(self.dataset.parameters(), CAMERA_NAME_KEY)?.ok_or_else(
                || ViewgridError::parameters(format!("missing '{CAMERA_NAME_KEY}'")),
            )?,
        };
        self.format_name(tpl)
    }
}

/// Applies the `{axis}_index_factor` / `{axis}_index_offset` calibration of a namespace.
pub(crate) fn local_axis_value(
    parameters: &ParameterSet,
    axis: &str,
    raw: i32,
) -> ViewgridResult<i64> {
    let factor = number_param(parameters, &format!("{axis}_index_factor"))?.unwrap_or(1.0);
    let offset = number_param(parameters, &format!("{axis}_index_offset"))?.unwrap_or(0.0);
    Ok((f64::from(raw) * factor).trunc() as i64 + offset.trunc() as i64)
}

pub(crate) fn overlay(base: &mut ParameterSet, local: &ParameterSet) {
    for (k, v) in local {
        base.insert(k.clone(), v.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/view.rs"]
mod tests;
