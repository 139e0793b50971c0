//! Fully-qualified type names

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Namespace separator inside qualified names
pub const SEPARATOR: char = '\\';

/// Fully-qualified name of an object type (`App\Dto\User`)
///
/// Names never carry the leading root marker; `\App\Dto\User` and
/// `App\Dto\User` produce the same `TypeName`. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Create a type name, stripping any leading root marker
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim_start_matches(SEPARATOR);
        Self(Arc::from(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace portion (`App\Dto` for `App\Dto\User`), if any
    pub fn namespace(&self) -> Option<&str> {
        self.0.rfind(SEPARATOR).map(|idx| &self.0[..idx])
    }

    /// Last segment (`User` for `App\Dto\User`)
    pub fn short_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Append a relative path (`App\Dto` + `User` = `App\Dto\User`)
    pub fn join(&self, rest: &str) -> TypeName {
        if rest.is_empty() {
            return self.clone();
        }
        TypeName::new(format!("{}{}{}", self.0, SEPARATOR, rest))
    }

    /// Whether every separator-delimited segment is non-empty
    pub fn has_empty_segment(name: &str) -> bool {
        name.split(SEPARATOR).any(str::is_empty)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName::new(name)
    }
}
