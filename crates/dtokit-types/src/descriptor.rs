//! Property descriptors
//!
//! A [`PropertyDescriptor`] is the resolved, immutable type contract of one
//! field. It is built once per declaring field by [`DescriptorBuilder`] and
//! never mutated afterwards.

use crate::alias::AliasRegistry;
use crate::error::DeclarationError;
use crate::name::TypeName;
use crate::parse::{DeclarationParser, ParsedDeclaration};
use crate::ty::TypeRef;

/// Whether a field belongs to the type's declared shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldOrigin {
    /// Part of the type's declared shape
    #[default]
    StaticallyDeclared,
    /// Added to the shape at runtime
    DynamicallyAdded,
}

/// Type the host already knows for a field, independent of its annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Type name as declared, without the nullable marker
    pub name: String,
    /// Whether the host type admits null
    pub nullable: bool,
}

impl NativeType {
    /// Parse a native type such as `int` or `?App\User`
    pub fn parse(decl: &str) -> Self {
        let decl = decl.trim();
        match decl.strip_prefix('?') {
            Some(name) => Self {
                name: name.trim().to_string(),
                nullable: true,
            },
            None => Self {
                name: decl.to_string(),
                nullable: false,
            },
        }
    }
}

/// Raw per-field input to descriptor construction
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl<'a> {
    /// Field identifier
    pub name: &'a str,
    /// Raw type declaration (`string|int`, `User[]`), if any
    pub declaration: Option<&'a str>,
    /// Explicit input key, if it differs from the field name
    pub source_key: Option<&'a str>,
    /// Statically-known host type, if any
    pub native_type: Option<&'a NativeType>,
    /// Whether the declaring type gives the field a non-null default
    pub has_default: bool,
    /// Declared or dynamically added
    pub origin: FieldOrigin,
}

impl<'a> FieldDecl<'a> {
    /// Declaration of an untyped, statically declared field
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            declaration: None,
            source_key: None,
            native_type: None,
            has_default: false,
            origin: FieldOrigin::StaticallyDeclared,
        }
    }
}

/// Resolved type contract of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    source_key: String,
    declaring_type: TypeName,
    types: Vec<TypeRef>,
    element_types: Vec<TypeRef>,
    nullable: bool,
    mixed: bool,
    mixed_collection: bool,
    has_default: bool,
    origin: FieldOrigin,
}

impl PropertyDescriptor {
    /// Field identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input key read for this field; never empty
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Type whose scope the declaration was resolved in
    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    /// Canonical allowed types, in declaration order; empty means untyped
    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    /// Element types of array/iterable members
    pub fn element_types(&self) -> &[TypeRef] {
        &self.element_types
    }

    /// Whether null is acceptable
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether validation is disabled entirely
    pub fn is_mixed(&self) -> bool {
        self.mixed
    }

    /// Whether any iterable is accepted without element checks
    pub fn is_mixed_collection(&self) -> bool {
        self.mixed_collection
    }

    /// Whether the declaring type gives a non-null default
    pub fn has_default_value(&self) -> bool {
        self.has_default
    }

    /// Declared or dynamically added
    pub fn origin(&self) -> FieldOrigin {
        self.origin
    }

    /// Whether the field is part of the type's declared shape
    pub fn is_statically_declared(&self) -> bool {
        self.origin == FieldOrigin::StaticallyDeclared
    }

    /// Canonical type identifiers, for diagnostics
    pub fn expected_types(&self) -> Vec<String> {
        self.types.iter().map(ToString::to_string).collect()
    }
}

/// Builds descriptors, resolving names through an alias registry
#[derive(Debug, Clone, Copy)]
pub struct DescriptorBuilder<'a> {
    parser: DeclarationParser<'a>,
}

impl<'a> DescriptorBuilder<'a> {
    /// Create a builder backed by `aliases`
    pub fn new(aliases: &'a AliasRegistry) -> Self {
        Self {
            parser: DeclarationParser::new(aliases),
        }
    }

    /// Build the descriptor of `decl`, declared inside `scope`
    pub fn build(&self, decl: &FieldDecl<'_>, scope: &TypeName) -> Result<PropertyDescriptor, DeclarationError> {
        if decl.name.is_empty() {
            return Err(DeclarationError::EmptyFieldName);
        }

        let mut parsed = match decl.declaration {
            Some(raw) => self.parser.parse(raw, scope)?,
            None => ParsedDeclaration::default(),
        };

        if let Some(native) = decl.native_type {
            let native_parsed = self.parser.parse(&native.name, scope)?;
            for ty in native_parsed.types {
                parsed.push_type(ty);
            }
            if native.nullable {
                parsed.push_type(TypeRef::Null);
            }
        }

        let source_key = decl
            .source_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(decl.name);

        let ParsedDeclaration {
            types,
            element_types,
        } = parsed;

        let mixed = types.is_empty() || types.contains(&TypeRef::Mixed);
        let nullable = mixed || types.contains(&TypeRef::Null);
        let mixed_collection = types.iter().any(TypeRef::is_untyped_collection);

        Ok(PropertyDescriptor {
            name: decl.name.to_string(),
            source_key: source_key.to_string(),
            declaring_type: scope.clone(),
            types,
            element_types,
            nullable,
            mixed,
            mixed_collection,
            has_default: decl.has_default,
            origin: decl.origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::ScalarKind;

    fn build(decl: FieldDecl<'_>) -> PropertyDescriptor {
        let aliases = AliasRegistry::default();
        DescriptorBuilder::new(&aliases)
            .build(&decl, &TypeName::new("App\\Dto\\User"))
            .unwrap()
    }

    #[test]
    fn test_native_type_parse() {
        assert_eq!(
            NativeType::parse("?int"),
            NativeType {
                name: "int".to_string(),
                nullable: true
            }
        );
        assert!(!NativeType::parse("string").nullable);
    }

    #[test]
    fn test_source_key_defaults_to_name() {
        let descriptor = build(FieldDecl::new("email"));
        assert_eq!(descriptor.source_key(), "email");

        let descriptor = build(FieldDecl {
            source_key: Some("EMAIL_ADDRESS"),
            ..FieldDecl::new("email")
        });
        assert_eq!(descriptor.source_key(), "EMAIL_ADDRESS");

        let descriptor = build(FieldDecl {
            source_key: Some("  "),
            ..FieldDecl::new("email")
        });
        assert_eq!(descriptor.source_key(), "email");
    }

    #[test]
    fn test_untyped_field_is_mixed_and_nullable() {
        let descriptor = build(FieldDecl::new("anything"));
        assert!(descriptor.types().is_empty());
        assert!(descriptor.is_mixed());
        assert!(descriptor.is_nullable());
        assert!(!descriptor.is_mixed_collection());
    }

    #[test]
    fn test_flags() {
        let descriptor = build(FieldDecl {
            declaration: Some("integer|null"),
            ..FieldDecl::new("count")
        });
        assert!(descriptor.is_nullable());
        assert!(!descriptor.is_mixed());

        let descriptor = build(FieldDecl {
            declaration: Some("mixed[]"),
            ..FieldDecl::new("items")
        });
        assert!(descriptor.is_mixed_collection());
        assert!(!descriptor.is_mixed());
        assert!(!descriptor.is_nullable());
    }

    #[test]
    fn test_native_type_is_unioned() {
        let native = NativeType::parse("?int");
        let descriptor = build(FieldDecl {
            declaration: Some("string"),
            native_type: Some(&native),
            ..FieldDecl::new("code")
        });
        assert_eq!(
            descriptor.types(),
            &[
                TypeRef::Scalar(ScalarKind::String),
                TypeRef::Scalar(ScalarKind::Integer),
                TypeRef::Null,
            ]
        );
        assert!(descriptor.is_nullable());
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let aliases = AliasRegistry::default();
        let result = DescriptorBuilder::new(&aliases).build(&FieldDecl::new(""), &TypeName::new("T"));
        assert_eq!(result, Err(DeclarationError::EmptyFieldName));
    }
}
