//! Type schemas and the schema registry
//!
//! A [`TypeSchema`] is the registration-time description of one target
//! type: its fields with their raw declarations, defaults and origin, plus
//! the types it extends and implements. Schemas are resolved lazily into
//! property descriptors by the [`DescriptorCache`](crate::DescriptorCache).

use crate::value::Value;
use dtokit_types::{DocTags, FieldDecl, FieldOrigin, NativeType, TypeName};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::warn;

/// Whether a field belongs to instances or to the type itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldScope {
    /// Per-instance field, filled by the mapper
    #[default]
    Instance,
    /// Class-level field, never read or written by the mapper
    Static,
}

/// Registration-time description of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    declaration: Option<String>,
    source_key: Option<String>,
    native: Option<NativeType>,
    default: Value,
    scope: FieldScope,
    origin: FieldOrigin,
}

impl FieldSpec {
    /// Untyped instance field named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaration: None,
            source_key: None,
            native: None,
            default: Value::Null,
            scope: FieldScope::Instance,
            origin: FieldOrigin::StaticallyDeclared,
        }
    }

    /// Field spec from a documentation comment's `@var` / `@source` tags
    pub fn from_doc_comment(name: impl Into<String>, doc: &str) -> Self {
        let tags = DocTags::parse(doc);
        Self {
            declaration: tags.var,
            source_key: tags.source,
            ..Self::new(name)
        }
    }

    /// Set the raw type declaration (`integer|null`, `Line[]`)
    pub fn typed(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// Read the field from `key` instead of its own name
    pub fn source(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Set the host's statically-known type (`int`, `?App\User`)
    pub fn native(mut self, declaration: &str) -> Self {
        self.native = Some(NativeType::parse(declaration));
        self
    }

    /// Set the type's own default for the field
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Mark the field as class-level
    pub fn static_field(mut self) -> Self {
        self.scope = FieldScope::Static;
        self
    }

    /// Mark the field as added at runtime rather than declared
    pub fn dynamic(mut self) -> Self {
        self.origin = FieldOrigin::DynamicallyAdded;
        self
    }

    /// Field identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance or class-level
    pub fn scope(&self) -> FieldScope {
        self.scope
    }

    /// Whether the field is class-level
    pub fn is_static(&self) -> bool {
        self.scope == FieldScope::Static
    }

    /// Declared default, `Null` when none was given
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether the field has a non-null default
    pub fn has_default(&self) -> bool {
        !self.default.is_null()
    }

    pub(crate) fn decl(&self) -> FieldDecl<'_> {
        FieldDecl {
            name: &self.name,
            declaration: self.declaration.as_deref(),
            source_key: self.source_key.as_deref(),
            native_type: self.native.as_ref(),
            has_default: self.has_default(),
            origin: self.origin,
        }
    }
}

/// Registration-time description of one target type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    name: TypeName,
    parent: Option<TypeName>,
    interfaces: Vec<TypeName>,
    fields: Vec<FieldSpec>,
}

impl TypeSchema {
    /// Schema for the fully-qualified type `name`, with no fields
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Inherit the fields of `parent`
    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare that instances are also instances of `interface`
    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        let interface = interface.into();
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Fully-qualified type name
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Parent type, if any
    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    /// Implemented interfaces
    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }

    /// Declared fields, static ones included
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// Registry of target type schemas
///
/// Written at registration time, read on every mapping. A type name can be
/// registered once; later registrations are ignored so that descriptors
/// already built from the first one stay valid.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<FxHashMap<TypeName, Arc<TypeSchema>>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    ///
    /// Returns `false` (and keeps the existing schema) when the type name is
    /// already registered.
    pub fn register(&self, schema: TypeSchema) -> bool {
        let mut schemas = self.schemas.write();
        if schemas.contains_key(schema.name()) {
            warn!(
                target: "dtokit::mapper",
                type_name = %schema.name(),
                "type already registered, keeping the first schema"
            );
            return false;
        }
        schemas.insert(schema.name().clone(), Arc::new(schema));
        true
    }

    /// Get a schema by type name
    pub fn get(&self, name: &TypeName) -> Option<Arc<TypeSchema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Check if a type name is registered
    pub fn contains(&self, name: &TypeName) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_spec_builder() {
        let spec = FieldSpec::new("count")
            .typed("integer")
            .source("COUNT")
            .native("?int")
            .default(5);

        let decl = spec.decl();
        assert_eq!(decl.name, "count");
        assert_eq!(decl.declaration, Some("integer"));
        assert_eq!(decl.source_key, Some("COUNT"));
        assert!(decl.native_type.map_or(false, |native| native.nullable));
        assert!(decl.has_default);
        assert_eq!(decl.origin, FieldOrigin::StaticallyDeclared);
    }

    #[test]
    fn test_null_default_is_no_default() {
        let spec = FieldSpec::new("note").default(Value::Null);
        assert!(!spec.has_default());
        assert!(!spec.decl().has_default);
    }

    #[test]
    fn test_from_doc_comment() {
        let spec = FieldSpec::from_doc_comment(
            "fieldWithSource",
            "/**\n * @var string|null\n * @source COMMENTARIY_DLYA_CLIENTA\n */",
        );
        let decl = spec.decl();
        assert_eq!(decl.declaration, Some("string|null"));
        assert_eq!(decl.source_key, Some("COMMENTARIY_DLYA_CLIENTA"));
    }

    #[test]
    fn test_static_and_dynamic_markers() {
        assert!(FieldSpec::new("shared").static_field().is_static());
        assert_eq!(
            FieldSpec::new("extra").dynamic().decl().origin,
            FieldOrigin::DynamicallyAdded
        );
    }

    #[test]
    fn test_schema_builder() {
        let schema = TypeSchema::new("\\App\\Dto\\Admin")
            .extends("App\\Dto\\User")
            .implements("App\\Contract\\HasRoles")
            .implements("App\\Contract\\HasRoles")
            .field(FieldSpec::new("roles").typed("string[]"));

        assert_eq!(schema.name().as_str(), "App\\Dto\\Admin");
        assert_eq!(schema.parent().map(TypeName::as_str), Some("App\\Dto\\User"));
        assert_eq!(schema.interfaces().len(), 1);
        assert_eq!(schema.fields().len(), 1);
    }

    #[test]
    fn test_registry_keeps_first_registration() {
        let registry = SchemaRegistry::new();
        assert!(registry.register(TypeSchema::new("T").field(FieldSpec::new("a"))));
        assert!(!registry.register(TypeSchema::new("T")));

        let schema = registry.get(&TypeName::new("T")).unwrap();
        assert_eq!(schema.fields().len(), 1);
        assert!(registry.contains(&TypeName::new("T")));
        assert!(!registry.contains(&TypeName::new("U")));
        assert_eq!(registry.len(), 1);
    }
}
