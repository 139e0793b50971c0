//! The mapper
//!
//! Orchestrates construction of one instance from dynamic input. Every
//! field goes through the same sequence:
//!
//! 1. look up the field's source key in the input
//! 2. if absent: keep a non-null default, reject a required field, or fall
//!    back to the instance's initial value
//! 3. cast the value towards the declared types
//! 4. validate the cast value and assign it
//!
//! The first failing field aborts the instance, and a failing nested
//! instance aborts every instance enclosing it.

use crate::cache::{DescriptorCache, TypeLayout};
use crate::cast::cast_value;
use crate::error::{MapError, MapResult};
use crate::instance::Instance;
use crate::options::MapperOptions;
use crate::schema::{SchemaRegistry, TypeSchema};
use crate::target::Target;
use crate::validate::is_valid;
use crate::value::Value;
use dtokit_types::{AliasRegistry, DescriptorBuilder, ImportSource, TypeName};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Constructs instances of registered types from dynamic input
///
/// A mapper holds its collaborators explicitly: the schema registry, the
/// alias registry used to resolve type names, and the descriptor cache.
/// Caches are shared by cloning the `Arc`s into several mappers.
pub struct Mapper {
    schemas: Arc<SchemaRegistry>,
    aliases: Arc<AliasRegistry>,
    descriptors: Arc<DescriptorCache>,
    options: MapperOptions,
}

impl Mapper {
    /// Create a mapper over `schemas`, with no imports and a fresh cache
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            aliases: Arc::new(AliasRegistry::default()),
            descriptors: Arc::new(DescriptorCache::new()),
            options: MapperOptions::default(),
        }
    }

    /// Resolve short type names through `source`
    pub fn with_imports(mut self, source: Arc<dyn ImportSource>) -> Self {
        self.aliases = Arc::new(AliasRegistry::new(source));
        self
    }

    /// Share an existing alias registry
    pub fn with_alias_registry(mut self, aliases: Arc<AliasRegistry>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Share an existing descriptor cache
    pub fn with_descriptor_cache(mut self, descriptors: Arc<DescriptorCache>) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Replace the options
    pub fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    /// Schema registry
    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    /// Descriptor cache
    pub fn descriptors(&self) -> &Arc<DescriptorCache> {
        &self.descriptors
    }

    /// Active options
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Register a schema; `false` if the type was already registered
    pub fn register_schema(&self, schema: TypeSchema) -> bool {
        self.schemas.register(schema)
    }

    /// Register the schema of a Rust target type
    pub fn register<T: Target>(&self) -> bool {
        self.schemas.register(T::schema())
    }

    /// Whether instances of `type_name` can be constructed
    pub fn is_mappable(&self, type_name: &TypeName) -> bool {
        self.schemas.contains(type_name)
    }

    /// Resolved field layout of `type_name`
    ///
    /// # Errors
    ///
    /// `UnknownType` if the type is not registered. Build failures
    /// (`InvalidDeclaration`, an unregistered ancestor) are cached and
    /// returned again on every later call.
    pub fn layout(&self, type_name: &TypeName) -> MapResult<Arc<TypeLayout>> {
        if !self.schemas.contains(type_name) {
            return Err(MapError::UnknownType {
                type_name: type_name.clone(),
            });
        }
        self.descriptors
            .get_or_build(type_name, || self.build_layout(type_name))
    }

    /// Construct an instance of `type_name` from `input`
    ///
    /// `input` is normally a map; any other value has no keys.
    pub fn map(&self, type_name: impl Into<TypeName>, input: &Value) -> MapResult<Instance> {
        self.instantiate(&type_name.into(), input, 0)
    }

    /// Construct an instance of `type_name` from JSON
    pub fn map_json(&self, type_name: impl Into<TypeName>, input: &serde_json::Value) -> MapResult<Instance> {
        self.map(type_name, &Value::from(input))
    }

    /// Construct a Rust target from `input`
    pub fn construct<T: Target>(&self, input: &Value) -> MapResult<T> {
        let instance = self.map(T::TYPE_NAME, input)?;
        T::from_instance(&instance)
    }

    /// Construct a Rust target from JSON
    pub fn construct_json<T: Target>(&self, input: &serde_json::Value) -> MapResult<T> {
        self.construct(&Value::from(input))
    }

    pub(crate) fn instantiate(&self, type_name: &TypeName, input: &Value, depth: usize) -> MapResult<Instance> {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(self.reject(MapError::DepthExceeded {
                    type_name: type_name.clone(),
                    limit,
                }));
            }
        }

        let layout = self.layout(type_name)?;
        trace!(target: "dtokit::mapper", type_name = %type_name, depth, "constructing instance");

        let mut instance = layout.new_instance();
        for (index, descriptor) in layout.descriptors().iter().enumerate() {
            let value = match input.get(descriptor.source_key()) {
                Some(value) => value.clone(),
                None if descriptor.has_default_value() => {
                    trace!(
                        target: "dtokit::mapper",
                        type_name = %type_name,
                        field = descriptor.name(),
                        "kept default"
                    );
                    continue;
                }
                None if !descriptor.is_nullable() && descriptor.is_statically_declared() => {
                    return Err(self.reject(MapError::MissingRequiredField {
                        type_name: type_name.clone(),
                        field: descriptor.name().to_string(),
                        source_key: descriptor.source_key().to_string(),
                    }));
                }
                None => instance.value_at(index).clone(),
            };

            let value = cast_value(self, descriptor, value, depth)?;
            if !is_valid(descriptor, &value) {
                return Err(self.reject(MapError::InvalidType {
                    type_name: type_name.clone(),
                    field: descriptor.name().to_string(),
                    expected: descriptor.expected_types(),
                    actual_kind: value.kind(),
                    actual: value.summary(),
                }));
            }

            trace!(
                target: "dtokit::mapper",
                type_name = %type_name,
                field = descriptor.name(),
                kind = %value.kind(),
                "assigned"
            );
            instance.set_at(index, value);
        }

        Ok(instance)
    }

    fn reject(&self, err: MapError) -> MapError {
        debug!(
            target: "dtokit::mapper",
            type_name = %err.type_name(),
            field = err.field().unwrap_or(""),
            error = %err,
            "mapping rejected"
        );
        err
    }

    /// Schemas of `type_name` and its ancestors, nearest first
    fn ancestry(&self, type_name: &TypeName) -> MapResult<Vec<Arc<TypeSchema>>> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = Some(type_name.clone());

        while let Some(name) = current {
            if !seen.insert(name.clone()) {
                return Err(MapError::CyclicInheritance {
                    type_name: type_name.clone(),
                });
            }
            let schema = self
                .schemas
                .get(&name)
                .ok_or(MapError::UnknownType { type_name: name })?;
            current = schema.parent().cloned();
            chain.push(schema);
        }

        Ok(chain)
    }

    fn build_layout(&self, type_name: &TypeName) -> MapResult<TypeLayout> {
        let chain = self.ancestry(type_name)?;
        let builder = DescriptorBuilder::new(&self.aliases);

        let mut lineage = Vec::new();
        let mut descriptors = Vec::new();
        let mut defaults = Vec::new();
        let mut declared = FxHashSet::default();

        for schema in &chain {
            for name in std::iter::once(schema.name()).chain(schema.interfaces()) {
                if !lineage.contains(name) {
                    lineage.push(name.clone());
                }
            }

            // Fields are resolved in the scope of the type declaring them
            for field in schema.fields() {
                if field.is_static() || !declared.insert(field.name()) {
                    continue;
                }
                let descriptor = builder
                    .build(&field.decl(), schema.name())
                    .map_err(|source| MapError::InvalidDeclaration {
                        type_name: type_name.clone(),
                        field: field.name().to_string(),
                        source,
                    })?;
                descriptors.push(Arc::new(descriptor));
                defaults.push(field.default_value().clone());
            }
        }

        debug!(
            target: "dtokit::descriptor",
            type_name = %type_name,
            fields = descriptors.len(),
            ancestors = chain.len() - 1,
            "resolved descriptors"
        );
        Ok(TypeLayout::new(type_name.clone(), lineage, descriptors, defaults))
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("schemas", &self.schemas.len())
            .field("aliases", &self.aliases)
            .field("descriptors", &self.descriptors)
            .field("options", &self.options)
            .finish()
    }
}
