//! Declarative bean definition.

/// Define a struct whose fields double as named, convertible properties.
///
/// The macro emits the struct unchanged, a [`Bean`](crate::Bean)
/// implementation wiring one [`PropertyDescriptor`](crate::PropertyDescriptor)
/// per field, and a [`ToValue`](crate::ToValue) implementation that wraps the
/// struct in [`Value::Bean`](crate::Value::Bean).
///
/// Every field must implement `Clone` and [`ToValue`](crate::ToValue).
/// `Option<T>` fields accept null by clearing to `None`, and `Vec<T>` fields
/// convert element-wise from list values; any other field type converts
/// through the registry as a whole. Generic structs are not supported, and
/// neither is nesting `Option`/`Vec` inside each other.
///
/// ```ignore
/// kopi::bean! {
///     #[derive(Clone, Debug, Default)]
///     pub struct Account {
///         pub id: i64,
///         pub name: String,
///         pub email: Option<String>,
///         pub tags: Vec<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! bean {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::__bean! {
            meta = [$(#[$meta])*],
            vis = [$vis],
            name = $name,
            fields = [],
            rest = [$($body)*],
        }
    };
}

/// Helper macro for [`bean!`]: munches one field per step, tagging it as
/// plain, optional, or list-valued.
#[doc(hidden)]
#[macro_export]
macro_rules! __bean {
    // Option<T> field.
    (
        meta = [$($meta:tt)*],
        vis = [$($vis:tt)*],
        name = $name:ident,
        fields = [$($fields:tt)*],
        rest = [
            $(#[$fmeta:meta])*
            $fvis:vis $fname:ident : Option<$fty:ty>
            $(, $($rest:tt)*)?
        ],
    ) => {
        $crate::__bean! {
            meta = [$($meta)*],
            vis = [$($vis)*],
            name = $name,
            fields = [$($fields)* [opt, $fname, ($fty), [$(#[$fmeta])*], $fvis]],
            rest = [$($($rest)*)?],
        }
    };
    // Vec<T> field.
    (
        meta = [$($meta:tt)*],
        vis = [$($vis:tt)*],
        name = $name:ident,
        fields = [$($fields:tt)*],
        rest = [
            $(#[$fmeta:meta])*
            $fvis:vis $fname:ident : Vec<$fty:ty>
            $(, $($rest:tt)*)?
        ],
    ) => {
        $crate::__bean! {
            meta = [$($meta)*],
            vis = [$($vis)*],
            name = $name,
            fields = [$($fields)* [vec, $fname, ($fty), [$(#[$fmeta])*], $fvis]],
            rest = [$($($rest)*)?],
        }
    };
    // Any other field type.
    (
        meta = [$($meta:tt)*],
        vis = [$($vis:tt)*],
        name = $name:ident,
        fields = [$($fields:tt)*],
        rest = [
            $(#[$fmeta:meta])*
            $fvis:vis $fname:ident : $fty:ty
            $(, $($rest:tt)*)?
        ],
    ) => {
        $crate::__bean! {
            meta = [$($meta)*],
            vis = [$($vis)*],
            name = $name,
            fields = [$($fields)* [val, $fname, ($fty), [$(#[$fmeta])*], $fvis]],
            rest = [$($($rest)*)?],
        }
    };
    // All fields munched: emit the struct and its impls.
    (
        meta = [$($meta:tt)*],
        vis = [$($vis:tt)*],
        name = $name:ident,
        fields = [$([$kind:ident, $fname:ident, ($fty:ty), [$($fmeta:tt)*], $($fvis:tt)*])*],
        rest = [],
    ) => {
        $($meta)*
        $($vis)* struct $name {
            $(
                $($fmeta)*
                $($fvis)* $fname: $crate::__bean_field_ty!($kind $fty),
            )*
        }

        impl $crate::Bean for $name {
            fn bean_name() -> &'static str {
                ::std::stringify!($name)
            }

            fn type_name(&self) -> &'static str {
                <Self as $crate::Bean>::bean_name()
            }

            fn properties() -> ::std::vec::Vec<$crate::PropertyDescriptor> {
                ::std::vec![
                    $($crate::__bean_descriptor!($kind, $name, $fname, $fty)),*
                ]
            }

            fn introspect(&self) -> ::std::vec::Vec<$crate::PropertyDescriptor> {
                <Self as $crate::Bean>::properties()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(self) -> $crate::Value {
                $crate::Value::Bean(::std::sync::Arc::new(self))
            }
        }
    };
}

/// Helper macro for [`bean!`]: expands a tagged field back to its full type.
#[doc(hidden)]
#[macro_export]
macro_rules! __bean_field_ty {
    (val $t:ty) => { $t };
    (opt $t:ty) => { ::std::option::Option<$t> };
    (vec $t:ty) => { ::std::vec::Vec<$t> };
}

/// Helper macro for [`bean!`]: a getter that clones one field out of a
/// downcast bean. A foreign bean reads as null.
#[doc(hidden)]
#[macro_export]
macro_rules! __bean_getter {
    ($owner:ident, $fname:ident) => {
        |bean: &dyn $crate::Bean| -> $crate::Value {
            match bean.as_any().downcast_ref::<$owner>() {
                ::std::option::Option::Some(owner) => {
                    $crate::ToValue::to_value(owner.$fname.clone())
                }
                ::std::option::Option::None => $crate::Value::Null,
            }
        }
    };
}

/// Helper macro for [`bean!`]: builds the descriptor for one tagged field,
/// including the converting setter.
#[doc(hidden)]
#[macro_export]
macro_rules! __bean_descriptor {
    (val, $owner:ident, $fname:ident, $fty:ty) => {
        $crate::PropertyDescriptor::new(
            ::std::stringify!($fname),
            ::std::stringify!($fty),
            ::std::any::TypeId::of::<$fty>(),
            $crate::__bean_getter!($owner, $fname),
            ::std::option::Option::Some(
                |bean: &mut dyn $crate::Bean,
                 value: $crate::Value,
                 registry: &$crate::ConverterRegistry|
                 -> ::std::result::Result<(), $crate::ConvertError> {
                    let owner = bean.as_any_mut().downcast_mut::<$owner>().ok_or(
                        $crate::ConvertError::BeanTypeMismatch {
                            expected: ::std::stringify!($owner),
                        },
                    )?;
                    match registry.try_convert::<$fty>(&value, ::std::option::Option::None)? {
                        ::std::option::Option::Some(converted) => {
                            owner.$fname = converted;
                            ::std::result::Result::Ok(())
                        }
                        ::std::option::Option::None => {
                            ::std::result::Result::Err($crate::ConvertError::Unconvertible {
                                value_type: value.type_name(),
                                target: ::std::stringify!($fty),
                            })
                        }
                    }
                },
            ),
        )
    };
    (opt, $owner:ident, $fname:ident, $fty:ty) => {
        $crate::PropertyDescriptor::new(
            ::std::stringify!($fname),
            ::std::concat!("Option<", ::std::stringify!($fty), ">"),
            ::std::any::TypeId::of::<::std::option::Option<$fty>>(),
            $crate::__bean_getter!($owner, $fname),
            ::std::option::Option::Some(
                |bean: &mut dyn $crate::Bean,
                 value: $crate::Value,
                 registry: &$crate::ConverterRegistry|
                 -> ::std::result::Result<(), $crate::ConvertError> {
                    let owner = bean.as_any_mut().downcast_mut::<$owner>().ok_or(
                        $crate::ConvertError::BeanTypeMismatch {
                            expected: ::std::stringify!($owner),
                        },
                    )?;
                    if value.is_null() {
                        owner.$fname = ::std::option::Option::None;
                        return ::std::result::Result::Ok(());
                    }
                    match registry.try_convert::<$fty>(&value, ::std::option::Option::None)? {
                        ::std::option::Option::Some(converted) => {
                            owner.$fname = ::std::option::Option::Some(converted);
                            ::std::result::Result::Ok(())
                        }
                        ::std::option::Option::None => {
                            ::std::result::Result::Err($crate::ConvertError::Unconvertible {
                                value_type: value.type_name(),
                                target: ::std::concat!(
                                    "Option<",
                                    ::std::stringify!($fty),
                                    ">"
                                ),
                            })
                        }
                    }
                },
            ),
        )
    };
    (vec, $owner:ident, $fname:ident, $fty:ty) => {
        $crate::PropertyDescriptor::new(
            ::std::stringify!($fname),
            ::std::concat!("Vec<", ::std::stringify!($fty), ">"),
            ::std::any::TypeId::of::<::std::vec::Vec<$fty>>(),
            $crate::__bean_getter!($owner, $fname),
            ::std::option::Option::Some(
                |bean: &mut dyn $crate::Bean,
                 value: $crate::Value,
                 registry: &$crate::ConverterRegistry|
                 -> ::std::result::Result<(), $crate::ConvertError> {
                    let owner = bean.as_any_mut().downcast_mut::<$owner>().ok_or(
                        $crate::ConvertError::BeanTypeMismatch {
                            expected: ::std::stringify!($owner),
                        },
                    )?;
                    match value {
                        $crate::Value::List(items) => {
                            let mut collected = ::std::vec::Vec::with_capacity(items.len());
                            for item in &items {
                                match registry
                                    .try_convert::<$fty>(item, ::std::option::Option::None)?
                                {
                                    ::std::option::Option::Some(converted) => {
                                        collected.push(converted)
                                    }
                                    ::std::option::Option::None => {
                                        return ::std::result::Result::Err(
                                            $crate::ConvertError::Unconvertible {
                                                value_type: item.type_name(),
                                                target: ::std::stringify!($fty),
                                            },
                                        )
                                    }
                                }
                            }
                            owner.$fname = collected;
                            ::std::result::Result::Ok(())
                        }
                        other => ::std::result::Result::Err(
                            $crate::ConvertError::Unconvertible {
                                value_type: other.type_name(),
                                target: ::std::concat!(
                                    "Vec<",
                                    ::std::stringify!($fty),
                                    ">"
                                ),
                            },
                        ),
                    }
                },
            ),
        )
    };
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use crate::bean::{Bean, PropertyDescriptor};
    use crate::convert::ConverterRegistry;
    use crate::error::ConvertError;
    use crate::value::{ToValue, Value};

    crate::bean! {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Ticket {
            id: u32,
            title: String,
            assignee: Option<String>,
            labels: Vec<String>,
        }
    }

    fn prop<'a>(props: &'a [PropertyDescriptor], name: &str) -> &'a PropertyDescriptor {
        props.iter().find(|p| p.name() == name).unwrap()
    }

    #[test]
    fn test_generated_descriptors() {
        assert_eq!(Ticket::bean_name(), "Ticket");
        let props = Ticket::properties();
        assert_eq!(props.len(), 4);

        assert_eq!(props[0].name(), "id");
        assert_eq!(prop(&props, "id").type_name(), "u32");
        assert_eq!(prop(&props, "id").type_id(), TypeId::of::<u32>());
        assert_eq!(prop(&props, "assignee").type_name(), "Option<String>");
        assert_eq!(
            prop(&props, "assignee").type_id(),
            TypeId::of::<Option<String>>()
        );
        assert_eq!(prop(&props, "labels").type_name(), "Vec<String>");
        assert!(props.iter().all(|p| p.is_writable()));
    }

    #[test]
    fn test_getter_reads_fields() {
        let ticket = Ticket {
            id: 5,
            title: "broken build".to_string(),
            assignee: None,
            labels: vec!["ci".to_string()],
        };
        let props = Ticket::properties();

        assert_eq!(prop(&props, "id").read(&ticket), Value::UInt(5));
        assert_eq!(
            prop(&props, "title").read(&ticket),
            Value::Str("broken build".to_string())
        );
        assert_eq!(prop(&props, "assignee").read(&ticket), Value::Null);
        assert_eq!(
            prop(&props, "labels").read(&ticket),
            Value::List(vec![Value::Str("ci".to_string())])
        );
    }

    #[test]
    fn test_getter_on_foreign_bean_reads_null() {
        crate::bean! {
            #[derive(Clone, Debug, Default)]
            struct Other {
                id: u32,
            }
        }

        let other = Other { id: 9 };
        let props = Ticket::properties();
        assert_eq!(prop(&props, "id").read(&other), Value::Null);
    }

    #[test]
    fn test_setter_converts_and_assigns() {
        let mut ticket = Ticket::default();
        let registry = ConverterRegistry::with_defaults();
        let props = Ticket::properties();

        let setter = prop(&props, "id").setter().unwrap();
        setter(&mut ticket, Value::Str("17".to_string()), &registry).unwrap();
        assert_eq!(ticket.id, 17);

        let err = setter(&mut ticket, Value::Str("oops".to_string()), &registry).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Unconvertible {
                value_type: "string",
                target: "u32",
            }
        );
        assert_eq!(ticket.id, 17);
    }

    #[test]
    fn test_setter_rejects_foreign_bean() {
        crate::bean! {
            #[derive(Clone, Debug, Default)]
            struct Decoy {
                id: u32,
            }
        }

        let mut decoy = Decoy::default();
        let registry = ConverterRegistry::with_defaults();
        let props = Ticket::properties();
        let setter = prop(&props, "id").setter().unwrap();

        let err = setter(&mut decoy, Value::UInt(1), &registry).unwrap_err();
        assert_eq!(err, ConvertError::BeanTypeMismatch { expected: "Ticket" });
    }

    #[test]
    fn test_optional_field_clears_on_null() {
        let mut ticket = Ticket {
            assignee: Some("amy".to_string()),
            ..Ticket::default()
        };
        let registry = ConverterRegistry::with_defaults();
        let props = Ticket::properties();
        let setter = prop(&props, "assignee").setter().unwrap();

        setter(&mut ticket, Value::Null, &registry).unwrap();
        assert_eq!(ticket.assignee, None);

        setter(&mut ticket, Value::Int(12), &registry).unwrap();
        assert_eq!(ticket.assignee.as_deref(), Some("12"));
    }

    #[test]
    fn test_list_field_converts_element_wise() {
        let mut ticket = Ticket::default();
        let registry = ConverterRegistry::with_defaults();
        let props = Ticket::properties();
        let setter = prop(&props, "labels").setter().unwrap();

        setter(
            &mut ticket,
            Value::List(vec![Value::Int(1), Value::Str("ci".to_string())]),
            &registry,
        )
        .unwrap();
        assert_eq!(ticket.labels, vec!["1".to_string(), "ci".to_string()]);

        // A non-list value names the whole field type.
        let err = setter(&mut ticket, Value::Int(3), &registry).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Unconvertible {
                value_type: "int",
                target: "Vec<String>",
            }
        );

        // A bad element names the element type.
        let err = setter(&mut ticket, Value::List(vec![Value::Null]), &registry).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Unconvertible {
                value_type: "null",
                target: "String",
            }
        );
    }

    #[test]
    fn test_to_value_wraps_bean() {
        let ticket = Ticket {
            id: 5,
            ..Ticket::default()
        };

        let value = ticket.clone().to_value();
        match &value {
            Value::Bean(bean) => {
                assert_eq!(bean.type_name(), "Ticket");
                let inner = bean.as_any().downcast_ref::<Ticket>().unwrap();
                assert_eq!(inner, &ticket);
            }
            other => panic!("expected a bean, got {other:?}"),
        }
    }
}
