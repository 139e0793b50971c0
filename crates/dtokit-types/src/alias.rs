//! Per-scope alias tables
//!
//! A scope (the fully-qualified name of a declaring type) sees short names
//! through its imports: `use App\Model\Address;` makes `Address` mean
//! `App\Model\Address` inside that scope. The owner of the type
//! declarations supplies imports through [`ImportSource`]; the
//! [`AliasRegistry`] builds one table per scope on first use and keeps it
//! for the life of the registry.

use crate::name::TypeName;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A single import: `use <target> as <alias>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Local name visible in the importing scope
    pub alias: String,
    /// Fully-qualified imported name
    pub target: TypeName,
}

impl Import {
    /// Import under the target's own short name
    pub fn new(target: impl Into<TypeName>) -> Self {
        let target = target.into();
        Self {
            alias: target.short_name().to_string(),
            target,
        }
    }

    /// Import under an explicit alias (`use target as alias;`)
    pub fn aliased(target: impl Into<TypeName>, alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            target: target.into(),
        }
    }
}

/// Short name to fully-qualified name mapping for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: FxHashMap<String, TypeName>,
}

impl AliasTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from imports; later duplicates overwrite earlier ones
    pub fn from_imports(imports: impl IntoIterator<Item = Import>) -> Self {
        let mut table = Self::new();
        for import in imports {
            table.insert(import);
        }
        table
    }

    /// Add an import, replacing any earlier import of the same alias
    pub fn insert(&mut self, import: Import) {
        self.entries.insert(import.alias, import.target);
    }

    /// Look up an alias
    pub fn get(&self, alias: &str) -> Option<&TypeName> {
        self.entries.get(alias)
    }

    /// Fold another table into this one; entries of `other` win
    pub fn merge(&mut self, other: &AliasTable) {
        for (alias, target) in &other.entries {
            self.entries.insert(alias.clone(), target.clone());
        }
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no aliases
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Supplier of import declarations for declaring scopes
pub trait ImportSource: Send + Sync {
    /// Alias table for `scope`, or `None` when nothing is known about it
    fn load(&self, scope: &TypeName) -> Option<AliasTable>;
}

/// Import source for code that never uses aliases
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportSource for NoImports {
    fn load(&self, _scope: &TypeName) -> Option<AliasTable> {
        None
    }
}

/// Explicitly registered imports, keyed by scope
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    scopes: FxHashMap<TypeName, AliasTable>,
}

impl ImportMap {
    /// Create an empty import map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one import for `scope`
    pub fn with_import(mut self, scope: impl Into<TypeName>, import: Import) -> Self {
        self.scopes.entry(scope.into()).or_default().insert(import);
        self
    }

    /// Register several imports for `scope`
    pub fn with_imports(
        mut self,
        scope: impl Into<TypeName>,
        imports: impl IntoIterator<Item = Import>,
    ) -> Self {
        let table = self.scopes.entry(scope.into()).or_default();
        for import in imports {
            table.insert(import);
        }
        self
    }
}

impl ImportSource for ImportMap {
    fn load(&self, scope: &TypeName) -> Option<AliasTable> {
        self.scopes.get(scope).cloned()
    }
}

/// Process-scoped cache of alias tables
///
/// Tables are built outside the map and published whole, so readers never
/// see a partial table. Two threads racing on the same scope may both
/// build it; the first published table is kept and returned to both.
pub struct AliasRegistry {
    tables: DashMap<TypeName, Arc<AliasTable>>,
    source: Arc<dyn ImportSource>,
}

impl AliasRegistry {
    /// Create a registry backed by `source`
    pub fn new(source: Arc<dyn ImportSource>) -> Self {
        Self {
            tables: DashMap::new(),
            source,
        }
    }

    /// Alias table for `scope`, building it on first access
    pub fn table(&self, scope: &TypeName) -> Arc<AliasTable> {
        if let Some(entry) = self.tables.get(scope) {
            return entry.value().clone();
        }

        let table = Arc::new(self.source.load(scope).unwrap_or_default());
        debug!(target: "dtokit::alias", scope = %scope, aliases = table.len(), "built alias table");

        self.tables
            .entry(scope.clone())
            .or_insert(table)
            .value()
            .clone()
    }

    /// Number of scopes with a published table
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table has been built yet
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        Self::new(Arc::new(NoImports))
    }
}

impl fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("scopes", &self.tables.len())
            .finish()
    }
}
