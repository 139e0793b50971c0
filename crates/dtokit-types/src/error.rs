//! Declaration errors

use thiserror::Error;

/// Errors raised while turning a raw type declaration into canonical types
///
/// Every variant is fatal for the descriptor being built. Callers report all
/// of them as an invalid declaration of the offending field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeclarationError {
    /// A type name was required but the token was empty (`[]`, `iterable<>`)
    #[error("Invalid type declaration `{token}`: empty type name")]
    EmptyTypeName {
        /// Token containing the empty position
        token: String,
    },

    /// A qualified name contains an empty segment (`Foo\\\\Bar`, `\`)
    #[error("Invalid type name `{name}`: empty namespace segment")]
    EmptySegment {
        /// Offending name
        name: String,
    },

    /// Array or wrapper punctuation does not balance
    #[error("Invalid type declaration `{token}`: unbalanced brackets")]
    UnbalancedBrackets {
        /// Offending token
        token: String,
    },

    /// Generic wrapper other than `iterable<T>` / `iterator<T>`
    #[error("Invalid type declaration `{token}`: unsupported wrapper `{wrapper}`")]
    UnsupportedWrapper {
        /// Wrapper name as written
        wrapper: String,
        /// Offending token
        token: String,
    },

    /// Union used as a wrapper element (`iterable<int|string>`)
    #[error("Invalid type declaration `{token}`: union element types are not supported")]
    UnionElement {
        /// Offending token
        token: String,
    },

    /// Field registered without a name
    #[error("Field name must not be empty")]
    EmptyFieldName,
}
