//! Field-wise copying between beans and maps.
//!
//! The copy engine reads properties from a source shape, runs them through
//! the converter registry, and writes them into a target shape. All four
//! shape combinations (bean/map on either side) share the same rules:
//! excluded properties are never read, a failed write never aborts the
//! copy, and source properties without a target counterpart are ignored.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::bean::{Bean, BeanMetadata, BeanMetadataCache};
use crate::convert::ConverterRegistry;
use crate::error::{BeanError, ConvertError};
use crate::value::{Value, ValueMap};

/// Per-call knobs for a copy operation.
///
/// The default policy copies every property, nulls included.
#[derive(Debug, Clone, Default)]
pub struct CopyPolicy {
    skip_null: bool,
    excluded: FxHashSet<String>,
}

impl CopyPolicy {
    /// Policy that copies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the target untouched when the source value is null.
    pub fn skip_null(mut self, skip: bool) -> Self {
        self.skip_null = skip;
        self
    }

    /// Exclude one property by name. Excluded properties are never read.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    /// Exclude several properties by name.
    pub fn exclude_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check whether a property name is excluded.
    #[inline]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Check whether null source values are skipped.
    #[inline]
    pub fn skips_null(&self) -> bool {
        self.skip_null
    }
}

/// Where property values are read from.
#[derive(Clone, Copy)]
pub enum CopySource<'a> {
    /// A bean; its metadata decides which properties exist.
    Bean(&'a dyn Bean),
    /// A map; every entry counts as a property.
    Map(&'a ValueMap),
}

impl fmt::Debug for CopySource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopySource::Bean(bean) => write!(f, "CopySource::Bean({})", bean.type_name()),
            CopySource::Map(map) => write!(f, "CopySource::Map(len={})", map.len()),
        }
    }
}

/// Where property values are written to.
pub enum CopyTarget<'a> {
    /// A bean; values run through its property setters and converters.
    Bean(&'a mut dyn Bean),
    /// A map; values are inserted as-is under the property name.
    Map(&'a mut ValueMap),
}

impl fmt::Debug for CopyTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyTarget::Bean(bean) => write!(f, "CopyTarget::Bean({})", bean.type_name()),
            CopyTarget::Map(map) => write!(f, "CopyTarget::Map(len={})", map.len()),
        }
    }
}

/// One property the engine could not write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSkip {
    /// Property name on the source side.
    pub property: String,
    /// Why the write failed.
    pub reason: ConvertError,
}

/// Outcome of a copy: how much was written, and what was left behind.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// Number of properties written to the target.
    pub copied: usize,
    /// Properties that could not be written, with the reason each failed.
    pub skipped: Vec<FieldSkip>,
}

impl CopyReport {
    /// Check that no property failed to copy.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ============================================================================
// Copy engine
// ============================================================================

/// Property copy engine: a metadata cache plus a converter registry.
///
/// A copier is meant to be built once, configured, and then shared; every
/// copy operation takes `&self`. Construction installs a [`ValueMap`]
/// converter backed by the copier's metadata cache, so any bean can be
/// flattened wherever a conversion asks for a map.
#[derive(Debug)]
pub struct BeanCopier {
    metadata: Arc<BeanMetadataCache>,
    registry: ConverterRegistry,
}

impl BeanCopier {
    /// Create a copier with the default converter set.
    pub fn new() -> Self {
        Self::with_registry(ConverterRegistry::with_defaults())
    }

    /// Create a copier around a caller-assembled registry.
    ///
    /// The [`ValueMap`] converter is only installed if the registry does
    /// not already carry one.
    pub fn with_registry(mut registry: ConverterRegistry) -> Self {
        let metadata = Arc::new(BeanMetadataCache::new());
        if !registry.contains::<ValueMap>() {
            let cache = Arc::clone(&metadata);
            registry.register("ValueMap", move |registry, value| match value {
                Value::Map(map) => Some(map.clone()),
                Value::Bean(bean) => {
                    let mut flat = ValueMap::new();
                    copy_fields(
                        &cache,
                        registry,
                        CopySource::Bean(bean.as_ref()),
                        CopyTarget::Map(&mut flat),
                        &CopyPolicy::default(),
                    )
                    .ok()?;
                    Some(flat)
                }
                _ => None,
            });
        }
        Self { metadata, registry }
    }

    /// Converter registry used for property writes.
    #[inline]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Mutable registry access, for adding project-specific converters.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Metadata cache backing this copier.
    #[inline]
    pub fn metadata(&self) -> &BeanMetadataCache {
        &self.metadata
    }

    /// Register a conversion target for a bean type.
    ///
    /// Afterwards any `Value::Map` or foreign `Value::Bean` converts into
    /// `T` by building a default instance and copying matching properties
    /// in. A `Value::Bean` already holding a `T` never reaches this
    /// converter; the registry clones it directly.
    pub fn register_bean<T>(&mut self)
    where
        T: Bean + Default + Clone,
    {
        let cache = Arc::clone(&self.metadata);
        self.registry.register(T::bean_name(), move |registry, value| {
            let source = match value {
                Value::Bean(bean) => CopySource::Bean(bean.as_ref()),
                Value::Map(map) => CopySource::Map(map),
                _ => return None,
            };
            let mut fresh = T::default();
            copy_fields(
                &cache,
                registry,
                source,
                CopyTarget::Bean(&mut fresh),
                &CopyPolicy::default(),
            )
            .ok()?;
            Some(fresh)
        });
    }

    /// Copy properties from any source shape into any target shape.
    pub fn copy(
        &self,
        source: CopySource<'_>,
        target: CopyTarget<'_>,
        policy: &CopyPolicy,
    ) -> Result<CopyReport, BeanError> {
        copy_fields(&self.metadata, &self.registry, source, target, policy)
    }

    /// Copy matching properties from one bean to another.
    pub fn copy_properties<S, T>(
        &self,
        source: &S,
        target: &mut T,
        policy: &CopyPolicy,
    ) -> Result<CopyReport, BeanError>
    where
        S: Bean,
        T: Bean,
    {
        self.copy(CopySource::Bean(source), CopyTarget::Bean(target), policy)
    }

    /// Flatten a bean into a property map.
    pub fn to_map(&self, bean: &dyn Bean, policy: &CopyPolicy) -> Result<ValueMap, BeanError> {
        let mut map = ValueMap::new();
        self.copy(CopySource::Bean(bean), CopyTarget::Map(&mut map), policy)?;
        Ok(map)
    }

    /// Build a fresh bean from a property map.
    ///
    /// Map entries without a matching property are ignored; entries that
    /// match but fail conversion land in the report.
    pub fn from_map<T>(
        &self,
        map: &ValueMap,
        policy: &CopyPolicy,
    ) -> Result<(T, CopyReport), BeanError>
    where
        T: Bean + Default,
    {
        let mut fresh = T::default();
        let report = self.copy(CopySource::Map(map), CopyTarget::Bean(&mut fresh), policy)?;
        Ok((fresh, report))
    }
}

impl Default for BeanCopier {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_fields(
    metadata: &BeanMetadataCache,
    registry: &ConverterRegistry,
    source: CopySource<'_>,
    target: CopyTarget<'_>,
    policy: &CopyPolicy,
) -> Result<CopyReport, BeanError> {
    let mut report = CopyReport::default();
    match target {
        CopyTarget::Map(map) => match source {
            CopySource::Bean(src) => {
                let src_meta = metadata.properties(src)?;
                for prop in src_meta.properties() {
                    if policy.is_excluded(prop.name()) {
                        continue;
                    }
                    let value = prop.read(src);
                    if value.is_null() && policy.skips_null() {
                        continue;
                    }
                    map.insert(prop.name().to_string(), value);
                    report.copied += 1;
                }
            }
            CopySource::Map(src) => {
                for (name, value) in src {
                    if policy.is_excluded(name) {
                        continue;
                    }
                    if value.is_null() && policy.skips_null() {
                        continue;
                    }
                    map.insert(name.clone(), value.clone());
                    report.copied += 1;
                }
            }
        },
        CopyTarget::Bean(bean) => {
            let dst_meta = metadata.properties(&*bean)?;
            match source {
                CopySource::Bean(src) => {
                    let src_meta = metadata.properties(src)?;
                    for prop in src_meta.properties() {
                        if policy.is_excluded(prop.name()) {
                            continue;
                        }
                        let value = prop.read(src);
                        write_property(
                            &dst_meta,
                            registry,
                            &mut *bean,
                            prop.name(),
                            value,
                            policy,
                            &mut report,
                        );
                    }
                }
                CopySource::Map(src) => {
                    for (name, value) in src {
                        if policy.is_excluded(name) {
                            continue;
                        }
                        write_property(
                            &dst_meta,
                            registry,
                            &mut *bean,
                            name,
                            value.clone(),
                            policy,
                            &mut report,
                        );
                    }
                }
            }
        }
    }
    Ok(report)
}

// One value headed for a bean property: resolve the name, convert, write.
fn write_property(
    target_meta: &BeanMetadata,
    registry: &ConverterRegistry,
    bean: &mut dyn Bean,
    name: &str,
    value: Value,
    policy: &CopyPolicy,
    report: &mut CopyReport,
) {
    if value.is_null() && policy.skips_null() {
        return;
    }
    // No counterpart on the target is not an error.
    let Some(prop) = target_meta.property_named(name) else {
        return;
    };
    let Some(setter) = prop.setter() else {
        return;
    };
    match setter(bean, value, registry) {
        Ok(()) => report.copied += 1,
        Err(reason) => {
            log::debug!(
                "property `{name}` not copied to {}: {reason}",
                target_meta.type_name()
            );
            report.skipped.push(FieldSkip {
                property: name.to_string(),
                reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::{Any, TypeId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::bean::PropertyDescriptor;
    use crate::value::ToValue;

    crate::bean! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Account {
            id: i64,
            name: String,
            email: Option<String>,
            tags: Vec<String>,
        }
    }

    crate::bean! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct AccountSummary {
            id: String,
            name: String,
        }
    }

    crate::bean! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Address {
            city: String,
            zip: String,
        }
    }

    crate::bean! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Customer {
            name: String,
            address: Address,
        }
    }

    fn sample_account() -> Account {
        Account {
            id: 7,
            name: "amy".to_string(),
            email: Some("amy@example.com".to_string()),
            tags: vec!["vip".to_string()],
        }
    }

    #[test]
    fn test_copy_between_same_bean_type() {
        let copier = BeanCopier::new();
        let source = sample_account();
        let mut target = Account::default();

        let report = copier
            .copy_properties(&source, &mut target, &CopyPolicy::new())
            .unwrap();

        assert_eq!(target, source);
        assert_eq!(report.copied, 4);
        assert!(report.is_clean());
    }

    #[test]
    fn test_bean_to_map_and_back() {
        let copier = BeanCopier::new();
        let source = Account {
            email: None,
            ..sample_account()
        };

        let map = copier.to_map(&source, &CopyPolicy::new()).unwrap();
        assert_eq!(map.get("id"), Some(&Value::Int(7)));
        assert_eq!(map.get("email"), Some(&Value::Null));

        let (back, report) = copier.from_map::<Account>(&map, &CopyPolicy::new()).unwrap();
        assert_eq!(back, source);
        assert_eq!(report.copied, 4);
        assert!(report.is_clean());
    }

    #[test]
    fn test_map_to_bean_coerces_values() {
        let copier = BeanCopier::new();
        let mut map = ValueMap::new();
        map.insert("id".to_string(), Value::Str("42".to_string()));
        map.insert("name".to_string(), Value::Int(9000));
        map.insert(
            "tags".to_string(),
            Value::List(vec![Value::Int(1), Value::Bool(true)]),
        );

        let (account, report) = copier.from_map::<Account>(&map, &CopyPolicy::new()).unwrap();

        assert_eq!(account.id, 42);
        assert_eq!(account.name, "9000");
        assert_eq!(account.tags, vec!["1".to_string(), "true".to_string()]);
        assert_eq!(account.email, None);
        assert_eq!(report.copied, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn test_conversion_failure_lands_in_report() {
        let copier = BeanCopier::new();
        let mut map = ValueMap::new();
        map.insert("id".to_string(), Value::Str("not a number".to_string()));
        map.insert("name".to_string(), Value::Str("ok".to_string()));

        let (account, report) = copier.from_map::<Account>(&map, &CopyPolicy::new()).unwrap();

        assert_eq!(account.id, 0);
        assert_eq!(account.name, "ok");
        assert_eq!(report.copied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].property, "id");
        assert_eq!(
            report.skipped[0].reason,
            ConvertError::Unconvertible {
                value_type: "string",
                target: "i64",
            }
        );
    }

    #[test]
    fn test_skip_null_preserves_target_values() {
        let copier = BeanCopier::new();
        let source = Account {
            id: 1,
            name: "new".to_string(),
            email: None,
            tags: Vec::new(),
        };
        let mut target = Account {
            email: Some("keep@example.com".to_string()),
            ..Account::default()
        };

        let report = copier
            .copy_properties(&source, &mut target, &CopyPolicy::new().skip_null(true))
            .unwrap();
        assert_eq!(report.copied, 3);
        assert_eq!(target.email.as_deref(), Some("keep@example.com"));
        assert_eq!(target.id, 1);
        assert_eq!(target.name, "new");

        // Without the policy the null overwrites.
        copier
            .copy_properties(&source, &mut target, &CopyPolicy::new())
            .unwrap();
        assert_eq!(target.email, None);
    }

    #[test]
    fn test_map_to_map_merge() {
        let copier = BeanCopier::new();
        let mut source = ValueMap::new();
        source.insert("a".to_string(), Value::Int(1));
        source.insert("b".to_string(), Value::Null);
        source.insert("c".to_string(), Value::Str("x".to_string()));
        let mut target = ValueMap::new();
        target.insert("b".to_string(), Value::Int(2));

        let policy = CopyPolicy::new().skip_null(true).exclude_all(["c"]);
        let report = copier
            .copy(CopySource::Map(&source), CopyTarget::Map(&mut target), &policy)
            .unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(target.get("a"), Some(&Value::Int(1)));
        assert_eq!(target.get("b"), Some(&Value::Int(2)));
        assert!(!target.contains_key("c"));

        // A plain policy lets the null through.
        copier
            .copy(
                CopySource::Map(&source),
                CopyTarget::Map(&mut target),
                &CopyPolicy::new(),
            )
            .unwrap();
        assert_eq!(target.get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_copy_between_bean_types_matches_by_name() {
        let copier = BeanCopier::new();
        let source = Account {
            email: None,
            tags: Vec::new(),
            ..sample_account()
        };
        let mut summary = AccountSummary::default();

        let report = copier
            .copy_properties(&source, &mut summary, &CopyPolicy::new())
            .unwrap();

        assert_eq!(summary.id, "7");
        assert_eq!(summary.name, "amy");
        // email and tags have no counterpart on the summary side.
        assert_eq!(report.copied, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_register_bean_enables_nested_conversion() {
        let mut copier = BeanCopier::new();
        copier.register_bean::<Address>();

        let mut address = ValueMap::new();
        address.insert("city".to_string(), Value::Str("Basel".to_string()));
        address.insert("zip".to_string(), Value::Str("4051".to_string()));
        let mut map = ValueMap::new();
        map.insert("name".to_string(), Value::Str("amy".to_string()));
        map.insert("address".to_string(), Value::Map(address));

        let (customer, report) = copier
            .from_map::<Customer>(&map, &CopyPolicy::new())
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(customer.name, "amy");
        assert_eq!(
            customer.address,
            Address {
                city: "Basel".to_string(),
                zip: "4051".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_bean_survives_map_round_trip() {
        // No registration needed: the nested value stays a bean and the
        // registry clones it back out by identity.
        let copier = BeanCopier::new();
        let customer = Customer {
            name: "amy".to_string(),
            address: Address {
                city: "Basel".to_string(),
                zip: "4051".to_string(),
            },
        };

        let map = copier.to_map(&customer, &CopyPolicy::new()).unwrap();
        let (back, report) = copier
            .from_map::<Customer>(&map, &CopyPolicy::new())
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(back, customer);
    }

    #[test]
    fn test_value_map_converter_flattens_beans() {
        let copier = BeanCopier::new();
        let address = Address {
            city: "Basel".to_string(),
            zip: "4051".to_string(),
        };

        let flat = copier
            .registry()
            .convert::<ValueMap>(&address.to_value(), None)
            .unwrap();

        assert_eq!(flat.get("city"), Some(&Value::Str("Basel".to_string())));
        assert_eq!(flat.get("zip"), Some(&Value::Str("4051".to_string())));
    }

    // Hand-rolled bean with a read counter on one getter and no setters.
    #[derive(Clone, Default)]
    struct Vault {
        open: i64,
        secret: i64,
    }

    static SECRET_READS: AtomicUsize = AtomicUsize::new(0);

    impl Bean for Vault {
        fn bean_name() -> &'static str {
            "Vault"
        }
        fn type_name(&self) -> &'static str {
            Self::bean_name()
        }
        fn properties() -> Vec<PropertyDescriptor> {
            vec![
                PropertyDescriptor::new(
                    "open",
                    "i64",
                    TypeId::of::<i64>(),
                    |bean| match bean.as_any().downcast_ref::<Vault>() {
                        Some(vault) => vault.open.to_value(),
                        None => Value::Null,
                    },
                    None,
                ),
                PropertyDescriptor::new(
                    "secret",
                    "i64",
                    TypeId::of::<i64>(),
                    |bean| {
                        SECRET_READS.fetch_add(1, Ordering::SeqCst);
                        match bean.as_any().downcast_ref::<Vault>() {
                            Some(vault) => vault.secret.to_value(),
                            None => Value::Null,
                        }
                    },
                    None,
                ),
            ]
        }
        fn introspect(&self) -> Vec<PropertyDescriptor> {
            Self::properties()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_excluded_properties_are_never_read() {
        let copier = BeanCopier::new();
        let vault = Vault { open: 1, secret: 99 };

        let map = copier
            .to_map(&vault, &CopyPolicy::new().exclude("secret"))
            .unwrap();

        assert_eq!(map.get("open"), Some(&Value::Int(1)));
        assert!(!map.contains_key("secret"));
        assert_eq!(SECRET_READS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_read_only_properties_are_skipped_as_targets() {
        let copier = BeanCopier::new();
        let mut map = ValueMap::new();
        map.insert("open".to_string(), Value::Int(5));

        let (vault, report) = copier.from_map::<Vault>(&map, &CopyPolicy::new()).unwrap();

        // No setter means the write is silently dropped, not reported.
        assert_eq!(vault.open, 0);
        assert_eq!(report.copied, 0);
        assert!(report.is_clean());
    }
}
