//! Canonical type references

use crate::name::TypeName;
use std::fmt;

/// Scalar kinds a declaration can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `int` / `integer`
    Integer,
    /// `float` / `double`
    Float,
    /// `bool` / `boolean`
    Boolean,
    /// `string`
    String,
}

impl ScalarKind {
    /// Canonical spelling of the kind
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One canonical member of a field's allowed-type set
///
/// `Display` renders the canonical identifier (`integer`, `App\User[]`,
/// `iterable<App\User>`), which is what error messages list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// `null`
    Null,
    /// `mixed`: accepts anything
    Mixed,
    /// Scalar kind
    Scalar(ScalarKind),
    /// Untyped `array`
    Array,
    /// Untyped `iterable`
    Iterable,
    /// Untyped `iterator`
    Iterator,
    /// `callable`
    Callable,
    /// `T[]`
    ArrayOf(Box<TypeRef>),
    /// `iterable<T>`
    IterableOf(Box<TypeRef>),
    /// `iterator<T>`
    IteratorOf(Box<TypeRef>),
    /// Named object type
    Object(TypeName),
}

impl TypeRef {
    /// Look up a builtin marker, case-insensitively
    ///
    /// Aliases are normalized to one spelling each: `int` to `integer`,
    /// `bool` to `boolean`, `double` to `float`.
    pub fn builtin(token: &str) -> Option<TypeRef> {
        let ty = match token.to_ascii_lowercase().as_str() {
            "string" => TypeRef::Scalar(ScalarKind::String),
            "int" | "integer" => TypeRef::Scalar(ScalarKind::Integer),
            "float" | "double" => TypeRef::Scalar(ScalarKind::Float),
            "bool" | "boolean" => TypeRef::Scalar(ScalarKind::Boolean),
            "array" => TypeRef::Array,
            "iterable" => TypeRef::Iterable,
            "iterator" => TypeRef::Iterator,
            "mixed" => TypeRef::Mixed,
            "null" => TypeRef::Null,
            "callable" => TypeRef::Callable,
            _ => return None,
        };
        Some(ty)
    }

    /// Element type of `T[]`, `iterable<T>` or `iterator<T>`
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::ArrayOf(inner) | TypeRef::IterableOf(inner) | TypeRef::IteratorOf(inner) => {
                Some(inner)
            }
            _ => None,
        }
    }

    /// Whether this names an object type
    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Object(_))
    }

    /// Object type name, if this names one
    pub fn as_object(&self) -> Option<&TypeName> {
        match self {
            TypeRef::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Scalar kind a raw scalar may be coerced into
    ///
    /// Only `integer`, `float` and `boolean` are coercion targets; strings
    /// are never produced by coercion.
    pub fn is_coercible_scalar(&self) -> Option<ScalarKind> {
        match self {
            TypeRef::Scalar(kind @ (ScalarKind::Integer | ScalarKind::Float | ScalarKind::Boolean)) => {
                Some(*kind)
            }
            _ => None,
        }
    }

    /// Whether this accepts any iterable without element checking
    pub fn is_untyped_collection(&self) -> bool {
        match self {
            TypeRef::Array | TypeRef::Iterable | TypeRef::Iterator => true,
            TypeRef::ArrayOf(inner) => **inner == TypeRef::Mixed,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Null => write!(f, "null"),
            TypeRef::Mixed => write!(f, "mixed"),
            TypeRef::Scalar(kind) => write!(f, "{}", kind),
            TypeRef::Array => write!(f, "array"),
            TypeRef::Iterable => write!(f, "iterable"),
            TypeRef::Iterator => write!(f, "iterator"),
            TypeRef::Callable => write!(f, "callable"),
            TypeRef::ArrayOf(inner) => write!(f, "{}[]", inner),
            TypeRef::IterableOf(inner) => write!(f, "iterable<{}>", inner),
            TypeRef::IteratorOf(inner) => write!(f, "iterator<{}>", inner),
            TypeRef::Object(name) => write!(f, "{}", name),
        }
    }
}
