//! Concurrency tests for shared registries and caches
//!
//! Tests cover:
//! - Concurrent first-time population of the descriptor cache
//! - Several mappers sharing one cache and one alias registry
//! - Concurrent registration of the same schema

use dtokit_core::{
    DescriptorCache, FieldSpec, ImportMap, Mapper, SchemaRegistry, TypeName, TypeSchema, Value,
};
use dtokit_types::{AliasRegistry, Import};
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

fn registry() -> Arc<SchemaRegistry> {
    let registry = SchemaRegistry::new();
    registry.register(
        TypeSchema::new("App\\Order")
            .field(FieldSpec::new("id").typed("integer"))
            .field(FieldSpec::new("lines").typed("Line[]"))
            .field(FieldSpec::new("note").typed("?string")),
    );
    registry.register(
        TypeSchema::new("App\\Line")
            .field(FieldSpec::new("sku").typed("string"))
            .field(FieldSpec::new("quantity").typed("int").default(1)),
    );
    Arc::new(registry)
}

fn order_input(id: usize) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "lines": [
            { "sku": "A-1", "quantity": "3" },
            { "sku": "B-2" },
        ],
    })
}

#[test]
fn test_concurrent_first_access_builds_consistent_layouts() {
    let mapper = Arc::new(Mapper::new(registry()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let mapper = Arc::clone(&mapper);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let order = mapper.map_json("App\\Order", &order_input(i)).unwrap();
                (i, order)
            })
        })
        .collect();

    for handle in handles {
        let (i, order) = handle.join().unwrap();
        assert_eq!(order.get("id"), Some(&Value::Int(i as i64)));
        assert_eq!(order.get("note"), Some(&Value::Null));
        assert_eq!(
            order.to_json()["lines"],
            json!([
                { "sku": "A-1", "quantity": 3 },
                { "sku": "B-2", "quantity": 1 },
            ])
        );
    }

    let order = TypeName::new("App\\Order");
    let first = mapper.layout(&order).unwrap();
    let second = mapper.layout(&order).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mapper.descriptors().len(), 2);
}

#[test]
fn test_mappers_share_cache() {
    let schemas = registry();
    let cache = Arc::new(DescriptorCache::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let mapper = Mapper::new(Arc::clone(&schemas)).with_descriptor_cache(Arc::clone(&cache));
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                mapper.map_json("App\\Order", &order_input(i)).is_ok()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    let layouts: Vec<_> = (0..THREADS)
        .map(|_| {
            Mapper::new(Arc::clone(&schemas))
                .with_descriptor_cache(Arc::clone(&cache))
                .layout(&TypeName::new("App\\Line"))
                .unwrap()
        })
        .collect();
    assert!(layouts.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_shared_alias_registry() {
    let imports = ImportMap::new().with_import("App\\Api\\Envelope", Import::aliased("App\\Line", "Item"));
    let aliases = Arc::new(AliasRegistry::new(Arc::new(imports)));
    let schemas = registry();
    schemas.register(TypeSchema::new("App\\Api\\Envelope").field(FieldSpec::new("item").typed("Item")));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let mapper = Mapper::new(Arc::clone(&schemas)).with_alias_registry(Arc::clone(&aliases));
            scope.spawn(move || {
                let envelope = mapper
                    .map_json("App\\Api\\Envelope", &json!({ "item": { "sku": "C-3" } }))
                    .unwrap();
                let item = envelope.get("item").and_then(Value::as_object).unwrap();
                assert!(item.is_instance_of("App\\Line"));
            });
        }
    });

    assert_eq!(aliases.len(), 1);
}

#[test]
fn test_concurrent_duplicate_registration() {
    let schemas = Arc::new(SchemaRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let schemas = Arc::clone(&schemas);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                schemas.register(TypeSchema::new("App\\Flag").field(FieldSpec::new("on").typed("bool")))
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|accepted| *accepted)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(schemas.len(), 1);
}
