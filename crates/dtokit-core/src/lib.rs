//! dtokit runtime
//!
//! Constructs typed value objects from dynamic, loosely-typed input. A
//! target type is described once by a [`TypeSchema`]; the [`Mapper`]
//! resolves its fields into cached property descriptors, casts every input
//! value towards the declared types, validates the result and assembles an
//! [`Instance`], recursing into nested object types and collections.
//!
//! # Example
//!
//! ```
//! use dtokit_core::{FieldSpec, Mapper, SchemaRegistry, TypeSchema, Value};
//! use std::sync::Arc;
//!
//! let schemas = Arc::new(SchemaRegistry::new());
//! schemas.register(
//!     TypeSchema::new("App\\Dto\\User")
//!         .field(FieldSpec::new("id").typed("integer"))
//!         .field(FieldSpec::new("email").typed("string|null").source("EMAIL")),
//! );
//!
//! let mapper = Mapper::new(schemas);
//! let input = Value::from(serde_json::json!({ "id": "42" }));
//! let user = mapper.map("App\\Dto\\User", &input).unwrap();
//!
//! assert_eq!(user.get("id"), Some(&Value::Int(42)));
//! assert_eq!(user.get("email"), Some(&Value::Null));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod cast;
pub mod error;
pub mod instance;
pub mod mapper;
pub mod options;
pub mod schema;
pub mod target;
pub mod validate;
pub mod value;

pub use cache::{DescriptorCache, TypeLayout};
pub use cast::{cast_value, coerce_scalar, should_become_collection};
pub use error::{MapError, MapResult};
pub use instance::Instance;
pub use mapper::Mapper;
pub use options::{MapperOptions, DEFAULT_MAX_DEPTH};
pub use schema::{FieldScope, FieldSpec, SchemaRegistry, TypeSchema};
pub use target::{FromValue, Target};
pub use validate::{is_valid, matches_type};
pub use value::{Value, ValueKind};

pub use dtokit_types::{ImportMap, ImportSource, SourceImports, TypeName};
