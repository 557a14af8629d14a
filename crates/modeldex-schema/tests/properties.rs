use modeldex_schema::{Error, prelude::*};
use proptest::prelude::*;
use std::sync::OnceLock;

const SNAPSHOT: &str = include_str!("fixtures/shopify.json");

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();

    REGISTRY.get_or_init(|| {
        let snapshot = RawSnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
        Registry::from_snapshot(snapshot, &LoadOptions::default()).expect("fixture loads")
    })
}

// (model, field) pairs of every closed enum in the fixture
fn closed_enums() -> Vec<(String, String)> {
    registry()
        .models()
        .flat_map(|model| {
            model
                .enum_fields()
                .filter(|field| field.enum_config().is_some_and(|c| !c.allow_other))
                .map(|field| (model.key.clone(), field.key.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn arb_closed_enum() -> impl Strategy<Value = (String, String)> {
    prop::sample::select(closed_enums())
}

fn arb_identifier() -> impl Strategy<Value = String> {
    let known: Vec<String> = registry()
        .index_entries()
        .into_iter()
        .flat_map(|(id, key)| [id.to_string(), key.to_string()])
        .collect();

    prop_oneof![
        prop::sample::select(known),
        "[a-zA-Z:.\\-]{0,24}",
    ]
}

proptest! {
    #[test]
    fn closed_enums_reject_exactly_the_undeclared(
        (model, field) in arb_closed_enum(),
        value in "[A-Za-z_/]{1,16}",
    ) {
        let registry = registry();
        let config = registry
            .field_by_key(&model, &field)
            .expect("field exists")
            .enum_config()
            .expect("enum field");

        let result = registry.validate_enum_value(&model, &field, value.as_str());
        if config.options.contains(&value) {
            prop_assert!(result.is_ok());
        } else {
            let rejected = matches!(result, Err(Error::InvalidEnumValue(_)));
            prop_assert!(rejected);
        }
    }

    #[test]
    fn closed_enums_accept_every_declared_option(
        (model, field) in arb_closed_enum(),
        pick in any::<prop::sample::Index>(),
    ) {
        let registry = registry();
        let config = registry
            .field_by_key(&model, &field)
            .expect("field exists")
            .enum_config()
            .expect("enum field");
        let options = config.options.options();
        let option = &options[pick.index(options.len())];

        let verdict = registry
            .validate_enum_value(&model, &field, option.name.as_str())
            .expect("declared option");
        prop_assert!(verdict.is_canonical());
    }

    #[test]
    fn repeated_loads_answer_identically(identifier in arb_identifier()) {
        let snapshot = RawSnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
        let second = Registry::from_snapshot(snapshot, &LoadOptions::default())
            .expect("fixture loads");
        let first = registry();

        prop_assert_eq!(first.fingerprint(), second.fingerprint());

        let a = first.get_model(&identifier).map(|m| m.key.clone());
        let b = second.get_model(&identifier).map(|m| m.key.clone());
        prop_assert_eq!(&a, &b);

        if let Ok(key) = a {
            let walk_a: Vec<_> = first.walk_state_chart(&key).expect("model").map(|s| s.key.clone()).collect();
            let walk_b: Vec<_> = second.walk_state_chart(&key).expect("model").map(|s| s.key.clone()).collect();
            prop_assert_eq!(walk_a, walk_b);

            for field in first.get_model(&key).expect("model").relationship_fields() {
                let left = first.resolve_relationship(&key, &field.key).map(|r| r.related_model.key.clone());
                let right = second.resolve_relationship(&key, &field.key).map(|r| r.related_model.key.clone());
                prop_assert_eq!(left, right);
            }
        }
    }
}
