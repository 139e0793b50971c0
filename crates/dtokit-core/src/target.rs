//! Typed construction
//!
//! A Rust struct becomes a mapping target by describing its schema and
//! reading itself back out of a mapped [`Instance`]:
//!
//! ```
//! use dtokit_core::{FieldSpec, Instance, MapResult, Target, TypeSchema};
//!
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Target for Point {
//!     const TYPE_NAME: &'static str = "Geo\\Point";
//!
//!     fn schema() -> TypeSchema {
//!         TypeSchema::new(Self::TYPE_NAME)
//!             .field(FieldSpec::new("x").typed("integer"))
//!             .field(FieldSpec::new("y").typed("integer"))
//!     }
//!
//!     fn from_instance(instance: &Instance) -> MapResult<Self> {
//!         Ok(Self {
//!             x: instance.field("x")?,
//!             y: instance.field("y")?,
//!         })
//!     }
//! }
//! ```

use crate::error::MapResult;
use crate::instance::Instance;
use crate::schema::TypeSchema;
use crate::value::Value;
use std::sync::Arc;

/// A Rust type that can be constructed by the mapper
pub trait Target: Sized {
    /// Fully-qualified name the schema is registered under
    const TYPE_NAME: &'static str;

    /// Field schema of the type
    fn schema() -> TypeSchema;

    /// Build the Rust value from a mapped instance
    fn from_instance(instance: &Instance) -> MapResult<Self>;
}

/// Conversion from a mapped field value
pub trait FromValue: Sized {
    /// What the conversion expects, for error messages
    fn expected() -> &'static str;

    /// Convert, or `None` if the value has the wrong shape
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn expected() -> &'static str {
        "integer"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for f64 {
    fn expected() -> &'static str {
        "float"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for bool {
    fn expected() -> &'static str {
        "boolean"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    fn expected() -> &'static str {
        "string"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Value {
    fn expected() -> &'static str {
        "value"
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for Arc<Instance> {
    fn expected() -> &'static str {
        "object"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn expected() -> &'static str {
        "list"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}
