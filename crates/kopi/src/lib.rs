//! Kopi - Bean copying, value conversion, and property introspection
//!
//! This crate moves data between structured types ("beans"), dynamic
//! property maps, and loosely-typed [`Value`]s. Structs declared with the
//! [`bean!`] macro expose their fields as named properties; a
//! [`BeanCopier`] copies matching properties between any two shapes,
//! coercing each value through a [`ConverterRegistry`] on the way. Type
//! metadata is computed once per type and held in a bounded cache.
//!
//! # Example
//!
//! ```ignore
//! use kopi::{BeanCopier, CopyPolicy};
//!
//! kopi::bean! {
//!     #[derive(Clone, Debug, Default)]
//!     pub struct Account {
//!         pub id: i64,
//!         pub name: String,
//!         pub email: Option<String>,
//!     }
//! }
//!
//! let copier = BeanCopier::new();
//! let account = Account { id: 7, name: "amy".into(), email: None };
//!
//! // Flatten to a map, then rebuild; "email" stays untouched.
//! let map = copier.to_map(&account, &CopyPolicy::new().skip_null(true))?;
//! let (back, report) = copier.from_map::<Account>(&map, &CopyPolicy::new())?;
//! assert!(report.is_clean());
//! ```

#![warn(missing_docs)]

pub mod bean;
pub mod convert;
pub mod decimal;
pub mod error;
pub mod value;

pub use bean::{
    Bean, BeanCopier, BeanMetadata, BeanMetadataCache, CopyPolicy, CopyReport, CopySource,
    CopyTarget, FieldSkip, Getter, PropertyDescriptor, Setter, DEFAULT_METADATA_CAPACITY,
};
pub use convert::{ConvertFn, ConverterRegistry};
pub use decimal::Decimal;
pub use error::{BeanError, ConvertError, ConvertResult};
pub use kopi_cache::BoundedCache;
pub use value::{ToValue, Value, ValueMap, DATETIME_PATTERN};
