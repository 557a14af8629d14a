use crate::{
    error::{IntegrityRule, Violations},
    node::{EnumConfig, EnumDefault, ModelDescriptor},
};
use std::collections::{BTreeMap, HashMap};

pub(super) fn validate_enums(models: &BTreeMap<String, ModelDescriptor>, errs: &mut Violations) {
    // option key -> route of first owner, registry-wide
    let mut option_keys: HashMap<&str, String> = HashMap::new();

    for (model_key, model) in models {
        for field in model.fields() {
            let Some(config) = field.enum_config() else {
                continue;
            };
            let route = format!("{model_key}.fields.{}", field.key);

            validate_options(config, &route, &field.key, &mut option_keys, errs);
            validate_default(config, &route, &field.key, errs);
        }
    }
}

fn validate_options<'a>(
    config: &'a EnumConfig,
    route: &str,
    field_key: &str,
    option_keys: &mut HashMap<&'a str, String>,
    errs: &mut Violations,
) {
    if config.options.is_empty() && !config.allow_other {
        errs.add(
            IntegrityRule::EmptyEnumOptions,
            route,
            field_key,
            format!("enum '{field_key}' has no options and does not allow other values"),
        );
    }

    let mut names: HashMap<&str, &str> = HashMap::new();
    for option in config.options.options() {
        if let Some(prev) = names.insert(&option.name, &option.key) {
            errs.add(
                IntegrityRule::DuplicateEnumOptionName,
                route,
                option.name.as_str(),
                format!(
                    "enum '{field_key}' repeats option name '{}' ('{prev}' and '{}')",
                    option.name, option.key
                ),
            );
        }

        if let Some(prev) = option_keys.insert(&option.key, route.to_string()) {
            errs.add(
                IntegrityRule::DuplicateEnumOptionKey,
                route,
                option.key.as_str(),
                format!("option key '{}' is also used by '{prev}'", option.key),
            );
        }
    }
}

fn validate_default(config: &EnumConfig, route: &str, field_key: &str, errs: &mut Violations) {
    let Some(default) = &config.default else {
        return;
    };

    if !config.allow_multiple && matches!(default, EnumDefault::Many(_)) {
        errs.add(
            IntegrityRule::InvalidEnumDefault,
            route,
            field_key,
            format!("single-valued enum '{field_key}' has a list default"),
        );
        return;
    }

    if config.allow_other {
        return;
    }
    for value in default.values() {
        if !config.options.contains(value) {
            errs.add(
                IntegrityRule::InvalidEnumDefault,
                route,
                field_key,
                format!("default '{value}' of enum '{field_key}' is not one of its options"),
            );
        }
    }
}
