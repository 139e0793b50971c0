//! dtokit type declarations
//!
//! Static half of dtokit: canonical type names, alias tables built from a
//! scope's imports, the type-declaration parser and the immutable property
//! descriptors consumed by the runtime in `dtokit-core`.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod alias;
pub mod descriptor;
pub mod docblock;
pub mod error;
pub mod name;
pub mod parse;
pub mod resolve;
pub mod scan;
pub mod ty;

pub use alias::{AliasRegistry, AliasTable, Import, ImportMap, ImportSource, NoImports};
pub use descriptor::{DescriptorBuilder, FieldDecl, FieldOrigin, NativeType, PropertyDescriptor};
pub use docblock::DocTags;
pub use error::DeclarationError;
pub use name::TypeName;
pub use parse::{DeclarationParser, ParsedDeclaration};
pub use resolve::TypeNameResolver;
pub use scan::{scan_imports, ScannedImports, SourceImports};
pub use ty::{ScalarKind, TypeRef};
