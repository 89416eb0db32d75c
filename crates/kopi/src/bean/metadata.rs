//! Per-type property metadata and its bounded cache.

use std::any::TypeId;
use std::sync::Arc;

use kopi_cache::BoundedCache;
use rustc_hash::FxHashSet;

use crate::bean::{Bean, PropertyDescriptor};
use crate::error::BeanError;

/// Default maximum number of bean types the metadata cache retains.
pub const DEFAULT_METADATA_CAPACITY: usize = 256;

/// Names that never appear in metadata: they describe the type itself
/// rather than its state, and copying them corrupts targets.
const RESERVED_NAMES: &[&str] = &["class", "type"];

/// Immutable, ordered property list for one bean type.
///
/// Built once per type, shared behind an `Arc`, never mutated. Order is
/// the declaration order of the descriptors.
#[derive(Debug)]
pub struct BeanMetadata {
    type_name: &'static str,
    properties: Vec<PropertyDescriptor>,
}

impl BeanMetadata {
    /// Validate and seal a raw descriptor list.
    ///
    /// Reserved names are dropped; an empty or duplicate name fails the
    /// whole list.
    pub fn build(
        type_name: &'static str,
        raw: Vec<PropertyDescriptor>,
    ) -> Result<Self, BeanError> {
        let mut seen = FxHashSet::default();
        let mut properties = Vec::with_capacity(raw.len());
        for descriptor in raw {
            let name = descriptor.name();
            if RESERVED_NAMES.contains(&name) {
                continue;
            }
            if name.is_empty() {
                return Err(BeanError::Introspection {
                    type_name,
                    reason: "property name is empty".to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(BeanError::Introspection {
                    type_name,
                    reason: format!("duplicate property name `{name}`"),
                });
            }
            properties.push(descriptor);
        }
        Ok(Self {
            type_name,
            properties,
        })
    }

    /// Owning type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Find one property by name.
    pub fn property_named(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the type exposes no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Bounded cache of per-type metadata, keyed by type identity.
///
/// The first request for a type runs its introspection and validation;
/// later requests return the shared [`BeanMetadata`]. A validation error
/// surfaces to the caller and is never cached, so a broken registration
/// fails on every request until fixed. Eviction only costs recomputation.
#[derive(Debug)]
pub struct BeanMetadataCache {
    cache: BoundedCache<TypeId, Arc<BeanMetadata>>,
}

impl BeanMetadataCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_METADATA_CAPACITY)
    }

    /// Create a cache retaining at most `max_types` type entries.
    pub fn with_capacity(max_types: usize) -> Self {
        Self {
            cache: BoundedCache::new(max_types),
        }
    }

    /// Metadata for a bean instance's concrete type.
    pub fn properties(&self, bean: &dyn Bean) -> Result<Arc<BeanMetadata>, BeanError> {
        self.cache
            .get_or_try_insert_with(bean.as_any().type_id(), || {
                BeanMetadata::build(bean.type_name(), bean.introspect()).map(Arc::new)
            })
    }

    /// Metadata for a statically-known bean type.
    pub fn properties_of<T: Bean>(&self) -> Result<Arc<BeanMetadata>, BeanError> {
        self.cache.get_or_try_insert_with(TypeId::of::<T>(), || {
            BeanMetadata::build(T::bean_name(), T::properties()).map(Arc::new)
        })
    }

    /// Look up one property of a bean's type by name.
    pub fn property_named(
        &self,
        bean: &dyn Bean,
        name: &str,
    ) -> Result<Option<PropertyDescriptor>, BeanError> {
        Ok(self.properties(bean)?.property_named(name).cloned())
    }

    /// Drop every cached entry, forcing recomputation on next use.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Number of cached type entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of cached type entries.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }
}

impl Default for BeanMetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
