use std::collections::BTreeMap;

use crate::{
    foundation::error::{ViewgridError, ViewgridResult},
    template::spec::FormatSpec,
};

/// Scalar value that can be bound to a template placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl TemplateValue {
    /// Converts a JSON scalar; arrays, objects and null have no template form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Str(b.to_string())),
            _ => None,
        }
    }
}

impl From<i32> for TemplateValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for TemplateValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for TemplateValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for TemplateValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Known placeholder values, by name.
pub type Bindings = BTreeMap<String, TemplateValue>;

/// Builds [`Bindings`] from `(name, value)` pairs.
pub fn bindings<K, V, I>(pairs: I) -> Bindings
where
    K: Into<String>,
    V: Into<TemplateValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Literal text, still carrying its `{{` / `}}` escapes.
    Literal(&'a str),
    Placeholder {
        /// Exact source text including the braces.
        raw: &'a str,
        name: &'a str,
        spec: &'a str,
    },
}

pub(crate) fn parse_template(tpl: &str) -> ViewgridResult<Vec<Segment<'_>>> {
    let bytes = tpl.as_bytes();
    let mut out = Vec::new();
    let mut lit_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'}' => {
                return Err(ViewgridError::template(format!(
                    "single '}}' at offset {i} in '{tpl}'"
                )));
            }
            b'{' => {
                let close = tpl[i + 1..]
                    .find(['{', '}'])
                    .map(|off| i + 1 + off)
                    .filter(|&j| bytes[j] == b'}')
                    .ok_or_else(|| {
                        ViewgridError::template(format!(
                            "unterminated or nested placeholder at offset {i} in '{tpl}'"
                        ))
                    })?;
                if lit_start < i {
                    out.push(Segment::Literal(&tpl[lit_start..i]));
                }
                let body = &tpl[i + 1..close];
                let (name, spec) = body.split_once(':').unwrap_or((body, ""));
                out.push(Segment::Placeholder {
                    raw: &tpl[i..=close],
                    name,
                    spec,
                });
                i = close + 1;
                lit_start = i;
            }
            _ => i += 1,
        }
    }
    if lit_start < bytes.len() {
        out.push(Segment::Literal(&tpl[lit_start..]));
    }
    Ok(out)
}

/// Substitutes the placeholders named in `known`, re-emitting all others unchanged.
///
/// The result is again a template: escapes are preserved and braces inside substituted
/// values are escaped, so instantiating twice with the same bindings is a no-op and an empty
/// binding set returns the input unchanged.
pub fn instantiate(tpl: &str, known: &Bindings) -> ViewgridResult<String> {
    let mut out = String::with_capacity(tpl.len());
    for seg in parse_template(tpl)? {
        match seg {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder { raw, name, spec } => match known.get(name) {
                Some(value) => {
                    let formatted = format_value(name, value, spec)?;
                    out.push_str(&formatted.replace('{', "{{").replace('}', "}}"));
                }
                None => out.push_str(raw),
            },
        }
    }
    Ok(out)
}

/// Fully formats `tpl`; every placeholder must be bound.
pub fn render(tpl: &str, known: &Bindings) -> ViewgridResult<String> {
    let mut out = String::with_capacity(tpl.len());
    for seg in parse_template(tpl)? {
        match seg {
            Segment::Literal(text) => out.push_str(&text.replace("{{", "{").replace("}}", "}")),
            Segment::Placeholder { raw, name, spec } => {
                let value = known.get(name).ok_or_else(|| {
                    ViewgridError::template(format!("no value for placeholder {raw} in '{tpl}'"))
                })?;
                out.push_str(&format_value(name, value, spec)?);
            }
        }
    }
    Ok(out)
}

/// Names of all placeholders in `tpl`, in order of appearance.
pub fn placeholder_names(tpl: &str) -> ViewgridResult<Vec<String>> {
    Ok(parse_template(tpl)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder { name, .. } => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect())
}

fn format_value(name: &str, value: &TemplateValue, spec: &str) -> ViewgridResult<String> {
    let parsed = FormatSpec::parse(spec)
        .map_err(|e| ViewgridError::template(format!("placeholder '{name}': {e}")))?;
    parsed
        .apply(value)
        .map_err(|e| ViewgridError::template(format!("placeholder '{name}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/template/engine.rs"]
mod tests;
