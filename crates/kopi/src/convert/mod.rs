//! Value conversion - per-target converter functions composed by a registry.
//!
//! A converter is a plain function from a [`Value`](crate::Value) to one
//! target type. Converters fail softly: impossible coercions return `None`,
//! and the [`ConverterRegistry`] substitutes the caller's default. The
//! registry parameter every converter receives lets structured converters
//! (beans, maps) recurse without a global table.
//!
//! [`scalars`] and [`datetime`] hold the stock converters installed by
//! [`ConverterRegistry::with_defaults`]; they are public so custom
//! registries can be composed from the same parts.

pub mod datetime;
mod registry;
pub mod scalars;

pub use registry::{ConvertFn, ConverterRegistry};
