//! Type declaration parsing
//!
//! Grammar (informal):
//!
//! ```text
//! decl    := token ('|' token)*
//! token   := '?'? (wrapped | arrayed | name)
//! wrapped := ('iterable' | 'iterator') '<' token '>'
//! arrayed := token '[' ']'
//! ```
//!
//! The union separator only splits at bracket depth zero, so a token such as
//! `iterable<Foo\Bar>` keeps its wrapper while `Foo\Bar` is resolved through
//! the declaring scope's aliases.

use crate::alias::AliasRegistry;
use crate::error::DeclarationError;
use crate::name::TypeName;
use crate::resolve::TypeNameResolver;
use crate::ty::TypeRef;

/// Canonical result of parsing one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDeclaration {
    /// Resolved union members, de-duplicated, in declaration order
    pub types: Vec<TypeRef>,
    /// Element types of every array/iterable member, de-duplicated
    pub element_types: Vec<TypeRef>,
}

impl ParsedDeclaration {
    /// Add a type unless already present
    pub fn push_type(&mut self, ty: TypeRef) {
        if let Some(element) = ty.element() {
            push_unique(&mut self.element_types, element.clone());
        }
        push_unique(&mut self.types, ty);
    }
}

/// Parser for raw type declarations
#[derive(Debug, Clone, Copy)]
pub struct DeclarationParser<'a> {
    resolver: TypeNameResolver<'a>,
}

impl<'a> DeclarationParser<'a> {
    /// Create a parser resolving names through `aliases`
    pub fn new(aliases: &'a AliasRegistry) -> Self {
        Self {
            resolver: TypeNameResolver::new(aliases),
        }
    }

    /// Parse `raw` as declared inside `scope`
    ///
    /// Empty union members are dropped, so an empty declaration yields an
    /// empty type set.
    pub fn parse(&self, raw: &str, scope: &TypeName) -> Result<ParsedDeclaration, DeclarationError> {
        let mut parsed = ParsedDeclaration::default();

        for token in split_union(raw) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let (nullable, body) = match token.strip_prefix('?') {
                Some(body) => (true, body.trim()),
                None => (false, token),
            };

            parsed.push_type(self.parse_token(body, token, scope)?);
            if nullable {
                parsed.push_type(TypeRef::Null);
            }
        }

        Ok(parsed)
    }

    fn parse_token(&self, body: &str, token: &str, scope: &TypeName) -> Result<TypeRef, DeclarationError> {
        if body.is_empty() {
            return Err(DeclarationError::EmptyTypeName {
                token: token.to_string(),
            });
        }

        if let Some(inner) = body.strip_suffix("[]") {
            let inner = inner.trim();
            if inner.is_empty() {
                return Err(DeclarationError::EmptyTypeName {
                    token: token.to_string(),
                });
            }
            let element = self.parse_token(inner, token, scope)?;
            return Ok(TypeRef::ArrayOf(Box::new(element)));
        }

        if body.ends_with('>') {
            return self.parse_wrapper(body, token, scope);
        }

        if body.contains(&['[', ']', '<', '>'][..]) {
            return Err(DeclarationError::UnbalancedBrackets {
                token: token.to_string(),
            });
        }

        self.resolver.resolve(body, scope)
    }

    fn parse_wrapper(&self, body: &str, token: &str, scope: &TypeName) -> Result<TypeRef, DeclarationError> {
        let open = body.find('<').ok_or_else(|| DeclarationError::UnbalancedBrackets {
            token: token.to_string(),
        })?;
        let wrapper = body[..open].trim();
        let inner = body[open + 1..body.len() - 1].trim();

        if inner.contains('|') {
            return Err(DeclarationError::UnionElement {
                token: token.to_string(),
            });
        }
        if inner.contains(',') {
            return Err(DeclarationError::UnsupportedWrapper {
                wrapper: wrapper.to_string(),
                token: token.to_string(),
            });
        }
        if inner.is_empty() {
            return Err(DeclarationError::EmptyTypeName {
                token: token.to_string(),
            });
        }

        let element = Box::new(self.parse_token(inner, token, scope)?);
        match wrapper.to_ascii_lowercase().as_str() {
            "iterable" => Ok(TypeRef::IterableOf(element)),
            "iterator" => Ok(TypeRef::IteratorOf(element)),
            _ => Err(DeclarationError::UnsupportedWrapper {
                wrapper: wrapper.to_string(),
                token: token.to_string(),
            }),
        }
    }
}

/// Split on `|` at bracket depth zero
fn split_union(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in raw.char_indices() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(&raw[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

fn push_unique(types: &mut Vec<TypeRef>, ty: TypeRef) {
    if !types.contains(&ty) {
        types.push(ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{Import, ImportMap};
    use crate::ty::ScalarKind;
    use std::sync::Arc;

    const SCOPE: &str = "App\\Dto\\Order";

    fn parse(raw: &str) -> Result<ParsedDeclaration, DeclarationError> {
        let imports = ImportMap::new().with_import(SCOPE, Import::new("App\\Model\\Line"));
        let aliases = AliasRegistry::new(Arc::new(imports));
        DeclarationParser::new(&aliases).parse(raw, &TypeName::new(SCOPE))
    }

    fn integer() -> TypeRef {
        TypeRef::Scalar(ScalarKind::Integer)
    }

    fn object(name: &str) -> TypeRef {
        TypeRef::Object(TypeName::new(name))
    }

    #[test]
    fn test_split_union_respects_brackets() {
        assert_eq!(split_union("a|b"), vec!["a", "b"]);
        assert_eq!(split_union("iterable<a|b>|c"), vec!["iterable<a|b>", "c"]);
        assert_eq!(split_union(""), vec![""]);
    }

    #[test]
    fn test_union_order_and_dedup() {
        let parsed = parse("string|int|integer|null").unwrap();
        assert_eq!(
            parsed.types,
            vec![TypeRef::Scalar(ScalarKind::String), integer(), TypeRef::Null]
        );
        assert!(parsed.element_types.is_empty());
    }

    #[test]
    fn test_empty_members_dropped() {
        assert!(parse("").unwrap().types.is_empty());
        assert_eq!(parse("null|boolean|mixed|").unwrap().types.len(), 3);
    }

    #[test]
    fn test_array_suffix_registers_element() {
        let parsed = parse("Line[]").unwrap();
        assert_eq!(
            parsed.types,
            vec![TypeRef::ArrayOf(Box::new(object("App\\Model\\Line")))]
        );
        assert_eq!(parsed.element_types, vec![object("App\\Model\\Line")]);
    }

    #[test]
    fn test_wrapper_registers_element() {
        let parsed = parse("iterable<\\Vendor\\Item>|iterator<int>").unwrap();
        assert_eq!(
            parsed.types,
            vec![
                TypeRef::IterableOf(Box::new(object("Vendor\\Item"))),
                TypeRef::IteratorOf(Box::new(integer())),
            ]
        );
        assert_eq!(parsed.element_types, vec![object("Vendor\\Item"), integer()]);
    }

    #[test]
    fn test_nested_array_element_is_array() {
        let parsed = parse("int[][]").unwrap();
        assert_eq!(
            parsed.element_types,
            vec![TypeRef::ArrayOf(Box::new(integer()))]
        );
    }

    #[test]
    fn test_nullable_shorthand() {
        let parsed = parse("?int").unwrap();
        assert_eq!(parsed.types, vec![integer(), TypeRef::Null]);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(parse("[]"), Err(DeclarationError::EmptyTypeName { .. })));
        assert!(matches!(parse("iterable<>"), Err(DeclarationError::EmptyTypeName { .. })));
        assert!(matches!(parse("Foo[]]"), Err(DeclarationError::UnbalancedBrackets { .. })));
        assert!(matches!(parse("Foo<Bar"), Err(DeclarationError::UnbalancedBrackets { .. })));
        assert!(matches!(
            parse("iterable<int|string>"),
            Err(DeclarationError::UnionElement { .. })
        ));
        assert!(matches!(
            parse("Collection<Line>"),
            Err(DeclarationError::UnsupportedWrapper { .. })
        ));
        assert!(matches!(
            parse("iterable<int, Line>"),
            Err(DeclarationError::UnsupportedWrapper { .. })
        ));
    }
}
