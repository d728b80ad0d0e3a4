use std::{fmt, str::FromStr};

use crate::foundation::error::{ViewgridError, ViewgridResult};

/// Position of a view in the camera grid.
///
/// `y` is `None` for datasets that are one-dimensional (or have been sliced down to one
/// dimension). The canonical text form is `"x"` or `"x,y"`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ViewIndex {
    pub x: i32,
    pub y: Option<i32>,
}

impl ViewIndex {
    pub fn new_1d(x: i32) -> Self {
        Self { x, y: None }
    }

    pub fn new_2d(x: i32, y: i32) -> Self {
        Self { x, y: Some(y) }
    }

    pub fn is_2d(self) -> bool {
        self.y.is_some()
    }

    /// Canonical string form used on command lines and as override keys.
    pub fn encode(self) -> String {
        self.to_string()
    }

    pub fn decode(text: &str) -> ViewgridResult<Self> {
        let parts = text.split(',').map(str::trim).collect::<Vec<_>>();
        let parse = |p: &str| {
            p.parse::<i32>().map_err(|_| {
                ViewgridError::invalid_index(format!("'{text}': component '{p}' is not an integer"))
            })
        };
        match parts.as_slice() {
            [x] => Ok(Self::new_1d(parse(x)?)),
            [x, y] => Ok(Self::new_2d(parse(x)?, parse(y)?)),
            _ => Err(ViewgridError::invalid_index(format!(
                "'{text}': expected 'x' or 'x,y'"
            ))),
        }
    }
}

impl fmt::Display for ViewIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.y {
            Some(y) => write!(f, "{},{}", self.x, y),
            None => write!(f, "{}", self.x),
        }
    }
}

impl FromStr for ViewIndex {
    type Err = ViewgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl TryFrom<String> for ViewIndex {
    type Error = ViewgridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)
    }
}

impl From<ViewIndex> for String {
    fn from(value: ViewIndex) -> Self {
        value.encode()
    }
}

/// Inclusive index range with a step, as persisted in `[min, max]` or `[min, max, step]` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    pub min: i32,
    pub max: i32, // inclusive
    pub step: i32,
}

impl IndexRange {
    pub fn new(min: i32, max: i32, step: i32) -> ViewgridResult<Self> {
        if step < 1 {
            return Err(ViewgridError::parameters(format!(
                "index range step must be >= 1 (got {step})"
            )));
        }
        if min > max {
            return Err(ViewgridError::parameters(format!(
                "index range min must be <= max (got [{min}, {max}])"
            )));
        }
        Ok(Self { min, max, step })
    }

    pub fn contains(self, v: i32) -> bool {
        v >= self.min && v <= self.max && self.offset(v) % i64::from(self.step) == 0
    }

    pub fn count(self) -> usize {
        (self.offset(self.max) / i64::from(self.step) + 1) as usize
    }

    /// Middle index, snapped down onto the step grid.
    pub fn mid(self) -> i32 {
        let step = i64::from(self.step);
        let half = self.offset(self.max) / 2;
        // Lies within [min, max], so it always fits back into i32.
        (i64::from(self.min) + (half / step) * step) as i32
    }

    // Distance from `min`, widened so full-width i32 ranges cannot overflow.
    fn offset(self, v: i32) -> i64 {
        i64::from(v) - i64::from(self.min)
    }

    pub fn indices(self) -> impl Iterator<Item = i32> {
        (self.min..=self.max).step_by(self.step as usize)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/index.rs"]
mod tests;
