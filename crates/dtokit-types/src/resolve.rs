//! Type name resolution
//!
//! Turns one raw type token, as written inside a declaring scope, into its
//! canonical form. Resolution order:
//!
//! 1. builtin markers (case-insensitive, aliases normalized)
//! 2. `self` / `static` / `$this` name the declaring type
//! 3. a leading `\` marks an already fully-qualified name
//! 4. the leading segment is looked up in the scope's alias table
//! 5. otherwise the name is relative to the scope's namespace

use crate::alias::AliasRegistry;
use crate::error::DeclarationError;
use crate::name::{TypeName, SEPARATOR};
use crate::ty::TypeRef;

/// Resolves raw type tokens against a declaring scope
#[derive(Debug, Clone, Copy)]
pub struct TypeNameResolver<'a> {
    aliases: &'a AliasRegistry,
}

impl<'a> TypeNameResolver<'a> {
    /// Create a resolver backed by the given alias registry
    pub fn new(aliases: &'a AliasRegistry) -> Self {
        Self { aliases }
    }

    /// Resolve `raw` as written inside `scope`
    ///
    /// # Errors
    ///
    /// `EmptyTypeName` for an empty token, `EmptySegment` for a qualified
    /// name with an empty segment.
    pub fn resolve(&self, raw: &str, scope: &TypeName) -> Result<TypeRef, DeclarationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DeclarationError::EmptyTypeName {
                token: raw.to_string(),
            });
        }

        if let Some(builtin) = TypeRef::builtin(raw) {
            return Ok(builtin);
        }

        let lower = raw.to_ascii_lowercase();
        if lower == "self" || lower == "static" || lower == "$this" {
            return Ok(TypeRef::Object(scope.clone()));
        }

        if let Some(qualified) = raw.strip_prefix(SEPARATOR) {
            return Self::qualified(qualified).map(TypeRef::Object);
        }

        if TypeName::has_empty_segment(raw) {
            return Err(DeclarationError::EmptySegment {
                name: raw.to_string(),
            });
        }

        let (head, rest) = match raw.split_once(SEPARATOR) {
            Some((head, rest)) => (head, rest),
            None => (raw, ""),
        };

        let table = self.aliases.table(scope);
        if let Some(target) = table.get(head) {
            return Ok(TypeRef::Object(target.join(rest)));
        }

        match scope.namespace() {
            Some(namespace) => Ok(TypeRef::Object(TypeName::new(namespace).join(raw))),
            None => Ok(TypeRef::Object(TypeName::new(raw))),
        }
    }

    fn qualified(name: &str) -> Result<TypeName, DeclarationError> {
        if TypeName::has_empty_segment(name) {
            return Err(DeclarationError::EmptySegment {
                name: format!("{}{}", SEPARATOR, name),
            });
        }
        Ok(TypeName::new(name))
    }
}
