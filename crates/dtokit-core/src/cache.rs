//! Descriptor cache
//!
//! Resolved per-type layouts, shared by every mapper that holds the cache.
//! Entries are append-only: a layout is built outside the map, published
//! whole with `entry().or_insert()` and never replaced. Two threads racing
//! on the same type may both build it; the first published result wins and
//! both callers get it.
//!
//! Failed builds are cached too, so a type with a broken declaration keeps
//! failing the same way instead of silently degrading.

use crate::error::MapResult;
use crate::instance::Instance;
use crate::value::Value;
use dashmap::DashMap;
use dtokit_types::{PropertyDescriptor, TypeName};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Resolved field layout of one type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeLayout {
    type_name: TypeName,
    lineage: Arc<[TypeName]>,
    descriptors: Vec<Arc<PropertyDescriptor>>,
    defaults: Vec<Value>,
}

impl TypeLayout {
    /// Create a layout
    ///
    /// `defaults` holds one initial value per descriptor, in the same order.
    pub fn new(
        type_name: TypeName,
        lineage: Vec<TypeName>,
        descriptors: Vec<Arc<PropertyDescriptor>>,
        defaults: Vec<Value>,
    ) -> Self {
        debug_assert_eq!(descriptors.len(), defaults.len());
        Self {
            type_name,
            lineage: Arc::from(lineage),
            descriptors,
            defaults,
        }
    }

    /// Type the layout describes
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// The type itself, its interfaces, then its ancestors
    pub fn lineage(&self) -> &[TypeName] {
        &self.lineage
    }

    /// Instance field descriptors: own fields first, then inherited ones
    pub fn descriptors(&self) -> &[Arc<PropertyDescriptor>] {
        &self.descriptors
    }

    /// Descriptor of the field named `name`
    pub fn descriptor(&self, name: &str) -> Option<&Arc<PropertyDescriptor>> {
        self.descriptors.iter().find(|descriptor| descriptor.name() == name)
    }

    /// Number of instance fields
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the type has no instance fields
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Fresh instance with every field at its default
    pub fn new_instance(&self) -> Instance {
        let fields = self
            .descriptors
            .iter()
            .zip(&self.defaults)
            .map(|(descriptor, default)| (descriptor.name().to_string(), default.clone()))
            .collect();
        Instance::new(self.type_name.clone(), self.lineage.clone(), fields)
    }
}

/// Process-scoped cache of type layouts
#[derive(Default)]
pub struct DescriptorCache {
    layouts: DashMap<TypeName, MapResult<Arc<TypeLayout>>>,
}

impl DescriptorCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the layout of `type_name`, building it on first access
    ///
    /// `build` runs without any lock held, so it may itself consult the
    /// cache for other types.
    pub fn get_or_build<F>(&self, type_name: &TypeName, build: F) -> MapResult<Arc<TypeLayout>>
    where
        F: FnOnce() -> MapResult<TypeLayout>,
    {
        if let Some(entry) = self.layouts.get(type_name) {
            return entry.value().clone();
        }

        let built = build().map(Arc::new);
        match &built {
            Ok(layout) => debug!(
                target: "dtokit::cache",
                type_name = %type_name,
                fields = layout.len(),
                "built descriptor layout"
            ),
            Err(err) => debug!(
                target: "dtokit::cache",
                type_name = %type_name,
                error = %err,
                "caching descriptor build failure"
            ),
        }

        self.layouts
            .entry(type_name.clone())
            .or_insert(built)
            .value()
            .clone()
    }

    /// Previously built result for `type_name`, if any
    pub fn get(&self, type_name: &TypeName) -> Option<MapResult<Arc<TypeLayout>>> {
        self.layouts.get(type_name).map(|entry| entry.value().clone())
    }

    /// Number of cached types, failures included
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("types", &self.layouts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use dtokit_types::{AliasRegistry, DescriptorBuilder, FieldDecl};
    use std::cell::Cell;

    fn layout(name: &str) -> TypeLayout {
        let aliases = AliasRegistry::default();
        let type_name = TypeName::new(name);
        let descriptor = DescriptorBuilder::new(&aliases)
            .build(
                &FieldDecl {
                    declaration: Some("integer"),
                    ..FieldDecl::new("count")
                },
                &type_name,
            )
            .unwrap();
        TypeLayout::new(
            type_name.clone(),
            vec![type_name],
            vec![Arc::new(descriptor)],
            vec![Value::Int(0)],
        )
    }

    #[test]
    fn test_builds_once() {
        let cache = DescriptorCache::new();
        let calls = Cell::new(0);
        let name = TypeName::new("App\\Counter");

        let first = cache
            .get_or_build(&name, || {
                calls.set(calls.get() + 1);
                Ok(layout("App\\Counter"))
            })
            .unwrap();
        let second = cache
            .get_or_build(&name, || {
                calls.set(calls.get() + 1);
                Ok(layout("App\\Counter"))
            })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_are_sticky() {
        let cache = DescriptorCache::new();
        let name = TypeName::new("App\\Broken");
        let failure = MapError::UnknownType {
            type_name: TypeName::new("App\\Missing"),
        };

        let first = cache.get_or_build(&name, || Err(failure.clone()));
        let second = cache.get_or_build(&name, || Ok(layout("App\\Broken")));

        assert_eq!(first, Err(failure.clone()));
        assert_eq!(second, Err(failure));
    }

    #[test]
    fn test_new_instance_uses_defaults() {
        let layout = layout("App\\Counter");
        let instance = layout.new_instance();
        assert_eq!(instance.get("count"), Some(&Value::Int(0)));
        assert!(instance.is_instance_of("App\\Counter"));
        assert!(layout.descriptor("count").is_some());
        assert!(layout.descriptor("other").is_none());
    }
}
