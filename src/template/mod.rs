//! Partial string templates for filename patterns.
//!
//! Templates use `{name}` / `{name:spec}` placeholders with a Python-style format spec.
//! [`instantiate`] substitutes only the bindings it is given and leaves every other
//! placeholder byte-for-byte intact, so a pattern such as `img_{y}_{frame:04d}.png` can be
//! resolved one axis at a time across pipeline stages. [`render`] is the final pass that
//! requires every placeholder to be bound.

pub(crate) mod engine;
pub(crate) mod spec;
