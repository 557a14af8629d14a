//! modeldex: inspect and check model metadata snapshots.
//!
//! Usage:
//!     modeldex --snapshot schema.json check
//!     modeldex --config modeldex.toml enum shopifyOrder tags VIP gift

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modeldex::{
    ErrorKind,
    config::Config,
    logging,
    prelude::*,
    schema::{node::EnumDefault, raw::RawSnapshot},
};
use std::{path::PathBuf, process::ExitCode};

#[derive(Debug, Parser)]
#[command(name = "modeldex", version, about = "Inspect and check model metadata snapshots")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot file; overrides the configuration and MODELDEX_SNAPSHOT
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Print JSON instead of text where supported
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the snapshot, listing every violation
    Check,

    /// Show one model and its fields
    Model { model: String },

    /// Show one field of a model
    Field { model: String, field: String },

    /// Resolve a relationship field to its related model and inverse
    Relation { model: String, field: String },

    /// Validate candidate values for an enum field
    Enum {
        model: String,
        field: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Walk a model's state chart in pre-order
    States { model: String },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    }
    .with_env();
    if let Some(snapshot) = &cli.snapshot {
        config.snapshot = Some(snapshot.clone());
    }

    logging::init(&config.log, cli.verbose);

    if let Command::Check = cli.command {
        return check(&config);
    }

    let registry = load_registry(config.snapshot_path()?, &config)?;
    run(&registry, cli.command, cli.json)
}

fn run(registry: &Registry, command: Command, json: bool) -> Result<ExitCode> {
    match command {
        Command::Model { model } => show_model(registry, &model, json)?,
        Command::Field { model, field } => show_field(registry, &model, &field, json)?,
        Command::Relation { model, field } => show_relation(registry, &model, &field)?,
        Command::Enum {
            model,
            field,
            values,
        } => return check_enum(registry, &model, &field, &values),
        Command::States { model } => show_states(registry, &model)?,
        Command::Check => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn check(config: &Config) -> Result<ExitCode> {
    let path = config.snapshot_path()?;
    let snapshot = RawSnapshot::from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let fingerprint = snapshot.fingerprint();

    match Registry::from_snapshot(snapshot, &config.load) {
        Ok(registry) => {
            println!(
                "ok: {} models, {} index entries, fingerprint {fingerprint}",
                registry.len(),
                registry.index_entries().len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{err}");
            for violation in err.violations() {
                println!("  {violation}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_model(registry: &Registry, model: &str, json: bool) -> Result<()> {
    let model = registry.get_model(model)?;
    if json {
        println!("{}", serde_json::to_string_pretty(model)?);
        return Ok(());
    }

    println!("{} ({})", model.name, model.key);
    println!("  api:     {}", model.qualified_api_identifier());
    println!("  graphql: {}", model.graphql_type_name);
    println!("  states:  {}", model.state_chart.len());
    println!("  fields:");
    for field in model.fields() {
        let target = field
            .related_model_key()
            .map(|key| format!(" -> {key}"))
            .unwrap_or_default();
        println!(
            "    {:<24} {:<16} {}{target}",
            field.api_identifier, field.field_type, field.key
        );
    }

    Ok(())
}

fn show_field(registry: &Registry, model: &str, field: &str, json: bool) -> Result<()> {
    let field = registry.get_field(model, field)?;
    if json {
        println!("{}", serde_json::to_string_pretty(field)?);
        return Ok(());
    }

    println!("{} ({})", field.name, field.key);
    println!("  api:      {}", field.api_identifier);
    println!("  type:     {}", field.field_type);
    println!("  writable: {}", field.internal_writable);
    if let Some(config) = field.enum_config() {
        println!(
            "  options:  {}",
            config.options.names().collect::<Vec<_>>().join(", ")
        );
        println!(
            "  multiple: {}, other: {}",
            config.allow_multiple, config.allow_other
        );
        if let Some(default) = config.default.as_ref().map(EnumDefault::values) {
            println!("  default:  {}", default.join(", "));
        }
    }

    Ok(())
}

fn show_relation(registry: &Registry, model: &str, field: &str) -> Result<()> {
    let rel = registry.resolve_relationship(model, field)?;

    println!(
        "{}.{} ({}) -> {}",
        rel.model.key, rel.field.api_identifier, rel.kind, rel.related_model.key
    );
    match rel.inverse_field {
        Some(inverse) => println!("  inverse: {} ({})", inverse.api_identifier, inverse.key),
        None => println!("  inverse: none"),
    }

    Ok(())
}

fn check_enum(registry: &Registry, model: &str, field: &str, values: &[String]) -> Result<ExitCode> {
    let descriptor = registry.get_field(model, field)?;
    let candidate = match values {
        [one] if !descriptor.enum_config().is_some_and(|c| c.allow_multiple) => {
            EnumInput::One(one)
        }
        many => EnumInput::from(many),
    };

    match registry.validate_enum_value(model, field, candidate) {
        Ok(verdict) => {
            println!("ok: {}", verdict.selected().join(", "));
            if !verdict.is_canonical() {
                println!("non-canonical: {}", verdict.non_canonical().join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let err = modeldex::Error::from(err);
            if err.kind != ErrorKind::InvalidEnumValue {
                return Err(err.into());
            }
            println!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_states(registry: &Registry, model: &str) -> Result<()> {
    for state in registry.walk_state_chart(model)? {
        let mut flags = Vec::new();
        if state.is_record_birth_place {
            flags.push("birth");
        }
        if state.is_undeleteable_system_state {
            flags.push("system");
        }
        if state.restore_history {
            flags.push("history");
        }

        let indent = "  ".repeat(state.depth().saturating_sub(1));
        println!(
            "{indent}{} [{}] {}",
            state.name,
            state.api_identifier,
            flags.join(" ")
        );
    }

    Ok(())
}
