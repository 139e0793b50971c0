//! Constructed instances of registered types

use crate::error::{MapError, MapResult};
use crate::target::{FromValue, Target};
use crate::value::Value;
use dtokit_types::TypeName;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// A fully constructed and validated instance of a registered type
///
/// Fields are kept in declaration order: the type's own fields first, then
/// inherited ones. Instances are immutable once the mapper returns them.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    type_name: TypeName,
    lineage: Arc<[TypeName]>,
    fields: Vec<(String, Value)>,
}

impl Instance {
    /// Create an instance holding the given initial field values
    ///
    /// `lineage` lists every type the instance is an instance of, starting
    /// with `type_name` itself.
    pub fn new(type_name: TypeName, lineage: Arc<[TypeName]>, fields: Vec<(String, Value)>) -> Self {
        Self {
            type_name,
            lineage,
            fields,
        }
    }

    /// Type this is an instance of
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// The type itself, its interfaces, then its ancestors
    pub fn lineage(&self) -> &[TypeName] {
        &self.lineage
    }

    /// Whether the instance is of `ty` or one of its subtypes
    pub fn is_instance_of(&self, ty: &str) -> bool {
        let ty = ty.trim_start_matches('\\');
        self.lineage.iter().any(|name| name.as_str() == ty)
    }

    /// Get a field value by field name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterate over `(field, value)` pairs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type has no instance fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn value_at(&self, index: usize) -> &Value {
        &self.fields[index].1
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        self.fields[index].1 = value;
    }

    /// Read a field into a Rust value
    ///
    /// # Errors
    ///
    /// `UnknownField` if the type has no such field, `Conversion` if the
    /// stored value does not fit `T`.
    pub fn field<T: FromValue>(&self, field: &str) -> MapResult<T> {
        let value = self.get(field).ok_or_else(|| MapError::UnknownField {
            type_name: self.type_name.clone(),
            field: field.to_string(),
        })?;

        T::from_value(value).ok_or_else(|| MapError::Conversion {
            type_name: self.type_name.clone(),
            field: field.to_string(),
            expected: T::expected(),
            actual_kind: value.kind(),
        })
    }

    /// Read a nested instance field into its Rust type
    pub fn nested<T: Target>(&self, field: &str) -> MapResult<T> {
        let instance: Arc<Instance> = self.field(field)?;
        T::from_instance(&instance)
    }

    /// Read a nullable nested instance field
    pub fn nested_opt<T: Target>(&self, field: &str) -> MapResult<Option<T>> {
        let instance: Option<Arc<Instance>> = self.field(field)?;
        instance.map(|instance| T::from_instance(&instance)).transpose()
    }

    /// Read a collection of nested instances
    pub fn nested_list<T: Target>(&self, field: &str) -> MapResult<Vec<T>> {
        let instances: Vec<Arc<Instance>> = self.field(field)?;
        instances
            .iter()
            .map(|instance| T::from_instance(instance))
            .collect()
    }

    /// Convert to a JSON object keyed by field name
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
