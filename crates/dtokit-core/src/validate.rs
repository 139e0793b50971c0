//! Type validation
//!
//! Decides whether a cast value satisfies a field's descriptor. Checks run
//! in order and the first one that accepts wins:
//!
//! 1. untyped or mixed fields accept anything
//! 2. mixed-collection fields accept any iterable
//! 3. nullable fields accept null
//! 4. an iterable is accepted when every element matches one element type
//! 5. otherwise the value must match one of the declared types

use crate::value::Value;
use dtokit_types::{PropertyDescriptor, ScalarKind, TypeRef};

/// Whether `value` satisfies `descriptor`
pub fn is_valid(descriptor: &PropertyDescriptor, value: &Value) -> bool {
    if descriptor.types().is_empty() || descriptor.is_mixed() {
        return true;
    }

    if value.is_iterable() && descriptor.is_mixed_collection() {
        return true;
    }

    if value.is_null() && descriptor.is_nullable() {
        return true;
    }

    if value.is_iterable()
        && descriptor
            .element_types()
            .iter()
            .any(|element| all_elements_match(element, value))
    {
        return true;
    }

    descriptor.types().iter().any(|ty| matches_type(ty, value))
}

/// Whether `value` matches one canonical type
///
/// Scalars match their exact kind, collection markers match lists and
/// maps, wrapper forms additionally check every element, and an object
/// type matches instances whose lineage contains it. `callable` matches
/// nothing.
pub fn matches_type(ty: &TypeRef, value: &Value) -> bool {
    match ty {
        TypeRef::Mixed => true,
        TypeRef::Null => value.is_null(),
        TypeRef::Scalar(kind) => matches!(
            (kind, value),
            (ScalarKind::Integer, Value::Int(_))
                | (ScalarKind::Float, Value::Float(_))
                | (ScalarKind::Boolean, Value::Bool(_))
                | (ScalarKind::String, Value::String(_))
        ),
        TypeRef::Array | TypeRef::Iterable | TypeRef::Iterator => value.is_iterable(),
        TypeRef::Callable => false,
        TypeRef::ArrayOf(element) | TypeRef::IterableOf(element) | TypeRef::IteratorOf(element) => {
            value.is_iterable() && all_elements_match(element, value)
        }
        TypeRef::Object(name) => value
            .as_object()
            .map_or(false, |instance| instance.is_instance_of(name.as_str())),
    }
}

fn all_elements_match(element: &TypeRef, value: &Value) -> bool {
    match value.iter_elements() {
        Some(mut elements) => elements.all(|item| matches_type(element, item)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use dtokit_types::{AliasRegistry, DescriptorBuilder, FieldDecl, TypeName};
    use std::sync::Arc;

    const DTO_C: &str = "App\\Tests\\Classes\\DtoC";

    fn descriptor(declaration: Option<&str>) -> PropertyDescriptor {
        let aliases = AliasRegistry::default();
        DescriptorBuilder::new(&aliases)
            .build(
                &FieldDecl {
                    declaration,
                    ..FieldDecl::new("field")
                },
                &TypeName::new("App\\Tests\\Fixture"),
            )
            .unwrap()
    }

    fn dto_c() -> Value {
        let name = TypeName::new(DTO_C);
        Value::from(Instance::new(
            name.clone(),
            Arc::from(vec![name]),
            vec![("booleanField".to_string(), Value::Bool(true))],
        ))
    }

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[test]
    fn test_untyped_accepts_anything() {
        let field = descriptor(None);
        for value in [Value::Int(1), Value::from("str"), Value::Bool(false), list(vec![]), dto_c()] {
            assert!(is_valid(&field, &value));
        }
    }

    #[test]
    fn test_null_only() {
        let field = descriptor(Some("null"));
        assert!(is_valid(&field, &Value::Null));
        assert!(!is_valid(&field, &list(vec![])));
        assert!(!is_valid(&field, &Value::Int(1)));
        assert!(!is_valid(&field, &Value::from("0")));
    }

    #[test]
    fn test_mixed_and_mixed_union() {
        for declaration in ["mixed", "mixed|\\App\\Tests\\Classes\\DtoC[]"] {
            let field = descriptor(Some(declaration));
            for value in [Value::Int(1), Value::from("str"), Value::Bool(true), list(vec![]), dto_c()] {
                assert!(is_valid(&field, &value), "{} should accept {:?}", declaration, value);
            }
        }
    }

    #[test]
    fn test_untyped_collections() {
        for declaration in ["array", "iterable"] {
            let field = descriptor(Some(declaration));
            assert!(is_valid(&field, &list(vec![])));
            assert!(is_valid(&field, &list(vec![Value::Int(1), Value::from("x")])));
            assert!(!is_valid(&field, &Value::Int(1)));
        }
    }

    #[test]
    fn test_typed_object_collections() {
        for declaration in ["\\App\\Tests\\Classes\\DtoC[]", "iterable<\\App\\Tests\\Classes\\DtoC>"] {
            let field = descriptor(Some(declaration));
            assert!(is_valid(&field, &list(vec![dto_c(), dto_c()])));
            assert!(is_valid(&field, &list(vec![])));
            assert!(!is_valid(&field, &list(vec![dto_c(), Value::Int(1)])));
            assert!(!is_valid(&field, &Value::Int(1)));
        }
    }

    #[test]
    fn test_scalar_kinds_exact() {
        let field = descriptor(Some("integer"));
        assert!(is_valid(&field, &Value::Int(1)));
        assert!(!is_valid(&field, &Value::Float(1.0)));
        assert!(!is_valid(&field, &Value::from("1")));
        assert!(!is_valid(&field, &Value::Null));
    }

    #[test]
    fn test_string_array_rejects_integers() {
        let field = descriptor(Some("string[]"));
        assert!(!is_valid(&field, &list(vec![Value::Int(1), Value::Int(2)])));
        assert!(is_valid(&field, &list(vec![Value::from("a")])));
    }

    #[test]
    fn test_object_instance_of() {
        let dto = dto_c();
        assert!(matches_type(&TypeRef::Object(TypeName::new(DTO_C)), &dto));
        assert!(!matches_type(&TypeRef::Object(TypeName::new("App\\Other")), &dto));
        assert!(!matches_type(&TypeRef::Object(TypeName::new(DTO_C)), &Value::Null));
    }

    #[test]
    fn test_callable_never_matches() {
        assert!(!matches_type(&TypeRef::Callable, &Value::from("strlen")));
        assert!(matches_type(
            &TypeRef::IteratorOf(Box::new(TypeRef::Scalar(ScalarKind::Integer))),
            &list(vec![Value::Int(1)])
        ));
    }
}
