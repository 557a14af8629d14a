use crate::{build::LoadOptions, raw::RawSnapshot, registry::Registry};

/// Six-model snapshot shaped like the generator's output.
pub(crate) const SHOPIFY_SNAPSHOT: &str = include_str!("../tests/fixtures/shopify.json");

pub(crate) fn snapshot() -> RawSnapshot {
    RawSnapshot::from_json_str(SHOPIFY_SNAPSHOT).expect("fixture snapshot parses")
}

pub(crate) fn registry() -> Registry {
    load(snapshot()).expect("fixture snapshot loads")
}

pub(crate) fn load(
    snapshot: RawSnapshot,
) -> Result<Registry, crate::error::SchemaIntegrityError> {
    Registry::from_snapshot(snapshot, &LoadOptions::default())
}

///
/// Raw snapshot edits, for corrupting the fixture in one place.
///

pub(crate) fn model_mut<'a>(
    snapshot: &'a mut RawSnapshot,
    key: &str,
) -> &'a mut crate::raw::RawModel {
    snapshot.models.get_mut(key).expect("fixture model exists")
}

pub(crate) fn config_mut<'a>(
    snapshot: &'a mut RawSnapshot,
    model: &str,
    field: &str,
) -> &'a mut serde_json::Map<String, serde_json::Value> {
    &mut model_mut(snapshot, model)
        .fields
        .get_mut(field)
        .expect("fixture field exists")
        .configuration
}
