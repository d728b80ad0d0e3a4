use std::{fs::File, io::Write as _, path::Path};

use anyhow::Context as _;
use serde::Serialize as _;
use serde_json::Value;

use crate::{
    dataset::model::{Dataset, ParameterSet, VIEWS_KEY, Y_COUNT_KEY, Y_RANGE_KEY, string_param},
    dataset::view::{
        CAMERA_NAME_KEY, DEPTH_FORMAT_KEY, IMAGE_FORMAT_KEY, KINECT_RAW_CLAUSE, MASK_FORMAT_KEY,
        VSRS_CLAUSE, local_axis_value, overlay,
    },
    foundation::error::{ViewgridError, ViewgridResult},
    foundation::index::ViewIndex,
    template::engine::{Bindings, TemplateValue, instantiate},
};

const FILENAME_KEYS: [&str; 3] = [IMAGE_FORMAT_KEY, DEPTH_FORMAT_KEY, MASK_FORMAT_KEY];
const Y_CALIBRATION_KEYS: [&str; 2] = ["y_index_factor", "y_index_offset"];
const CLAUSES: [&str; 2] = [VSRS_CLAUSE, KINECT_RAW_CLAUSE];

/// Projects a 2d dataset onto the row `y`, producing a standalone 1d parameter document.
///
/// The y bounds are removed and every top-level filename template has `{y}` resolved to the
/// raw row index, while other placeholders stay verbatim. Clause templates use the clause-local
/// y instead, and the clause drops its y calibration keys. Per-view overrides on row `y` are
/// re-keyed to 1d indices.
#[tracing::instrument(skip(dataset))]
pub fn slice_parameters(dataset: &Dataset, y: i32) -> ViewgridResult<ParameterSet> {
    dataset.require_2d("slicing")?;
    if !dataset.y_valid(y) {
        return Err(ViewgridError::out_of_range(format!(
            "y slice {y} out of range (valid: {:?})",
            dataset.y_indices()
        )));
    }

    let mut out = dataset.parameters().clone();
    out.remove(Y_RANGE_KEY);
    out.remove(Y_COUNT_KEY);
    let views = out.remove(VIEWS_KEY);

    slice_namespace(&mut out, dataset.parameters(), y)?;

    if let Some(Value::Object(views)) = views {
        let mut sliced = ParameterSet::new();
        for (key, local) in views {
            let idx = ViewIndex::decode(&key)?;
            if idx.y != Some(y) {
                continue;
            }
            let Value::Object(mut local) = local else {
                continue;
            };
            slice_namespace(&mut local, dataset.parameters(), y)?;
            sliced.insert(ViewIndex::new_1d(idx.x).encode(), Value::Object(local));
        }
        if !sliced.is_empty() {
            out.insert(VIEWS_KEY.to_string(), Value::Object(sliced));
        }
    }

    Ok(out)
}

/// Resolves `{y}` in the namespace `ns` and in its clauses. `ns` is either the global
/// parameter set or one override overlaying `base`.
fn slice_namespace(ns: &mut ParameterSet, base: &ParameterSet, y: i32) -> ViewgridResult<()> {
    resolve_keys(ns, &[CAMERA_NAME_KEY], i64::from(y))?;
    resolve_keys(ns, &FILENAME_KEYS, i64::from(y))?;

    for name in CLAUSES {
        let Some(Value::Object(clause)) = ns.get_mut(name) else {
            continue;
        };
        let mut clause_scope = base
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        overlay(&mut clause_scope, clause);
        let clause_y = local_axis_value(&clause_scope, "y", y)?;
        resolve_keys(clause, &FILENAME_KEYS, clause_y)?;
        strip_y_calibration(clause);
    }
    Ok(())
}

fn resolve_keys(ns: &mut ParameterSet, keys: &[&str], y: i64) -> ViewgridResult<()> {
    let mut known = Bindings::new();
    known.insert("y".to_string(), TemplateValue::Int(y));
    for key in keys {
        if let Some(tpl) = string_param(ns, key)? {
            let resolved = instantiate(tpl, &known)?;
            ns.insert((*key).to_string(), Value::String(resolved));
        }
    }
    Ok(())
}

fn strip_y_calibration(ns: &mut ParameterSet) {
    for key in Y_CALIBRATION_KEYS {
        ns.remove(key);
    }
}

/// Writes a parameter document as pretty JSON with sorted keys and 4-space indentation.
pub fn write_parameters(parameters: &ParameterSet, path: impl AsRef<Path>) -> ViewgridResult<()> {
    let path = path.as_ref();
    crate::tools::invoke::ensure_parent_dir(path)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    parameters
        .serialize(&mut ser)
        .map_err(|e| ViewgridError::serde(format!("serialize parameters: {e}")))?;
    buf.push(b'\n');

    let mut f = File::create(path)
        .with_context(|| format!("create parameters '{}'", path.display()))?;
    f.write_all(&buf)
        .with_context(|| format!("write parameters '{}'", path.display()))?;
    Ok(())
}

/// Loads `in_path`, slices it at `y` and writes the result to `out_path`.
pub fn slice_file(
    in_path: impl AsRef<Path>,
    y: i32,
    out_path: impl AsRef<Path>,
) -> ViewgridResult<()> {
    let dataset = Dataset::open(in_path)?;
    let sliced = slice_parameters(&dataset, y)?;
    write_parameters(&sliced, out_path)?;
    tracing::info!(y, "sliced dataset written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/slice.rs"]
mod tests;
