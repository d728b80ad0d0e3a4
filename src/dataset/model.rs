use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde_json::{Map, Value};

use crate::{
    dataset::view::View,
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::{IndexRange, ViewIndex},
};

/// JSON object holding dataset or clause parameters.
pub type ParameterSet = Map<String, Value>;

/// Top-level key holding per-view override objects, keyed by encoded [`ViewIndex`].
pub const VIEWS_KEY: &str = "views";
pub const X_RANGE_KEY: &str = "x_index_range";
pub const Y_RANGE_KEY: &str = "y_index_range";
pub const X_COUNT_KEY: &str = "x_count";
pub const Y_COUNT_KEY: &str = "y_count";

/// A multi-view dataset: global parameters plus grid bounds.
///
/// Constructed once from a parameter document and immutable afterwards. Relative paths in
/// the document resolve against the directory the document was loaded from.
#[derive(Clone, Debug)]
pub struct Dataset {
    root: PathBuf,
    parameters: ParameterSet,
    x_range: IndexRange,
    y_range: Option<IndexRange>,
}

impl Dataset {
    pub fn open(path: impl AsRef<Path>) -> ViewgridResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open parameters '{}'", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            ViewgridError::serde(format!("parse parameters '{}': {e}", path.display()))
        })?;
        let Value::Object(parameters) = value else {
            return Err(ViewgridError::parameters(format!(
                "'{}' must contain a JSON object",
                path.display()
            )));
        };
        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::from_parameters(parameters, root)
    }

    pub fn from_parameters(
        parameters: ParameterSet,
        root: impl Into<PathBuf>,
    ) -> ViewgridResult<Self> {
        let x_range = parse_range(&parameters, X_RANGE_KEY, X_COUNT_KEY)?.ok_or_else(|| {
            ViewgridError::parameters(format!("missing '{X_RANGE_KEY}' (or '{X_COUNT_KEY}')"))
        })?;
        let y_range = parse_range(&parameters, Y_RANGE_KEY, Y_COUNT_KEY)?;

        if let Some(views) = parameters.get(VIEWS_KEY) {
            let views = views.as_object().ok_or_else(|| {
                ViewgridError::parameters(format!("'{VIEWS_KEY}' must be an object"))
            })?;
            for (key, value) in views {
                ViewIndex::decode(key)?;
                if !value.is_object() {
                    return Err(ViewgridError::parameters(format!(
                        "override for view '{key}' must be an object"
                    )));
                }
            }
        }

        Ok(Self {
            root: root.into(),
            parameters,
            x_range,
            y_range,
        })
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a dataset-relative path.
    pub fn filepath(&self, relpath: impl AsRef<Path>) -> PathBuf {
        self.root.join(relpath)
    }

    pub fn is_2d(&self) -> bool {
        self.y_range.is_some()
    }

    pub fn is_1d(&self) -> bool {
        self.y_range.is_none()
    }

    pub fn x_range(&self) -> IndexRange {
        self.x_range
    }

    pub fn y_range(&self) -> Option<IndexRange> {
        self.y_range
    }

    pub fn x_valid(&self, x: i32) -> bool {
        self.x_range.contains(x)
    }

    pub fn y_valid(&self, y: i32) -> bool {
        self.y_range.is_some_and(|r| r.contains(y))
    }

    pub fn x_count(&self) -> usize {
        self.x_range.count()
    }

    pub fn y_count(&self) -> usize {
        self.y_range.map_or(1, IndexRange::count)
    }

    pub fn x_indices(&self) -> Vec<i32> {
        self.x_range.indices().collect()
    }

    pub fn y_indices(&self) -> Vec<i32> {
        self.y_range.map_or_else(Vec::new, |r| r.indices().collect())
    }

    /// Index of the view nearest the grid centre.
    pub fn mid_index(&self) -> ViewIndex {
        ViewIndex {
            x: self.x_range.mid(),
            y: self.y_range.map(IndexRange::mid),
        }
    }

    /// Every view index of the grid, row by row.
    pub fn indices(&self) -> Vec<ViewIndex> {
        match self.y_range {
            Some(yr) => yr
                .indices()
                .flat_map(|y| self.x_range.indices().map(move |x| ViewIndex::new_2d(x, y)))
                .collect(),
            None => self.x_range.indices().map(ViewIndex::new_1d).collect(),
        }
    }

    /// All indices of row `y` (the sub-grid with `y` fixed).
    pub fn row(&self, y: i32) -> ViewgridResult<Vec<ViewIndex>> {
        self.require_2d("row projection")?;
        if !self.y_valid(y) {
            return Err(ViewgridError::out_of_range(format!("y = {y} is not a grid row")));
        }
        Ok(self
            .x_range
            .indices()
            .map(|x| ViewIndex::new_2d(x, y))
            .collect())
    }

    pub fn require_2d(&self, what: &str) -> ViewgridResult<()> {
        if self.is_2d() {
            Ok(())
        } else {
            Err(ViewgridError::structural(format!("{what} requires a 2d dataset")))
        }
    }

    pub fn check_index(&self, idx: ViewIndex) -> ViewgridResult<()> {
        match (idx.y, self.y_range) {
            (Some(_), None) => {
                return Err(ViewgridError::structural(format!(
                    "view index {idx} is 2d but the dataset is 1d"
                )));
            }
            (None, Some(_)) => {
                return Err(ViewgridError::structural(format!(
                    "view index {idx} is 1d but the dataset is 2d"
                )));
            }
            _ => {}
        }
        if !self.x_valid(idx.x) {
            return Err(ViewgridError::out_of_range(format!(
                "x view index out of range in {idx}"
            )));
        }
        if let Some(y) = idx.y
            && !self.y_valid(y)
        {
            return Err(ViewgridError::out_of_range(format!(
                "y view index out of range in {idx}"
            )));
        }
        Ok(())
    }

    pub fn view(&self, idx: ViewIndex) -> ViewgridResult<View<'_>> {
        self.check_index(idx)?;
        Ok(View::new(self, idx))
    }

    /// Local parameter overrides recorded for `idx`, if any.
    pub fn overrides(&self, idx: ViewIndex) -> Option<&ParameterSet> {
        self.parameters
            .get(VIEWS_KEY)?
            .as_object()?
            .iter()
            .find(|(k, _)| ViewIndex::decode(k).is_ok_and(|i| i == idx))
            .and_then(|(_, v)| v.as_object())
    }

    pub fn cameras_filename(&self) -> ViewgridResult<PathBuf> {
        let rel = string_param(&self.parameters, "cameras_filename")?
            .ok_or_else(|| ViewgridError::parameters("missing 'cameras_filename'"))?;
        Ok(self.filepath(rel))
    }

    /// Image size declared by the dataset (`width`, `height`).
    pub fn image_size(&self) -> ViewgridResult<(u32, u32)> {
        let dim = |key: &str| -> ViewgridResult<u32> {
            self.parameters
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    ViewgridError::parameters(format!("missing or invalid '{key}'"))
                })
        };
        Ok((dim("width")?, dim("height")?))
    }
}

fn parse_range(
    parameters: &ParameterSet,
    range_key: &str,
    count_key: &str,
) -> ViewgridResult<Option<IndexRange>> {
    if let Some(value) = parameters.get(range_key) {
        let items = value
            .as_array()
            .ok_or_else(|| ViewgridError::parameters(format!("'{range_key}' must be an array")))?;
        let ints = items
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| {
                        ViewgridError::parameters(format!("'{range_key}' entries must be integers"))
                    })
            })
            .collect::<ViewgridResult<Vec<_>>>()?;
        return match ints.as_slice() {
            [min, max] => IndexRange::new(*min, *max, 1).map(Some),
            [min, max, step] => IndexRange::new(*min, *max, *step).map(Some),
            _ => Err(ViewgridError::parameters(format!(
                "'{range_key}' must be [min, max] or [min, max, step]"
            ))),
        };
    }
    if let Some(value) = parameters.get(count_key) {
        let count = value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .filter(|&n| n >= 1)
            .ok_or_else(|| {
                ViewgridError::parameters(format!("'{count_key}' must be a positive integer"))
            })?;
        return IndexRange::new(0, count - 1, 1).map(Some);
    }
    Ok(None)
}

/// String-typed parameter lookup; a present but non-string value is an error.
pub(crate) fn string_param<'p>(
    parameters: &'p ParameterSet,
    key: &str,
) -> ViewgridResult<Option<&'p str>> {
    match parameters.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ViewgridError::parameters(format!("'{key}' must be a string"))),
    }
}

pub(crate) fn number_param(parameters: &ParameterSet, key: &str) -> ViewgridResult<Option<f64>> {
    match parameters.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ViewgridError::parameters(format!("'{key}' must be a number"))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/model.rs"]
mod tests;
