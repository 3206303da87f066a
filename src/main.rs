#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use directories::BaseDirs;
use mcp_ferry::{
    app_config::AppConfig,
    cli::{Cli, Commands, DiffArgs, ListArgs, MigrateArgs},
    merge::Winner,
    migrate::{MigrationPlan, MigrationRequest, MigrationResult, Migrator},
    registry::{Ide, SchemaRegistry},
    ConflictResolutions,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(cli.debug, cli.trace);

    let app_config = load_and_log_config()?.unwrap_or_default();
    let home = resolve_home(cli.home)?;
    let registry = app_config.registry(&home)?;
    debug!("Resolving IDE config paths against {}", home.display());

    let migrator = Migrator::new(registry);

    match cli.command {
        Commands::Migrate(args) => run_migrate(&migrator, &app_config, args),
        Commands::Diff(args) => run_diff(&migrator, &app_config, &args),
        Commands::List(args) => run_list(migrator.registry(), &args),
    }
}

/// Initialize tracing with the specified debug/trace flags
fn initialize_tracing(debug: bool, trace: bool) {
    let log_level = if trace {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::builder().with_default_directive(log_level.into()).from_env_lossy())
        .init();
}

/// Load application configuration and log its status
fn load_and_log_config() -> Result<Option<AppConfig>> {
    let app_config = AppConfig::load().context("Failed to load app configuration")?;

    if let Some(ref config) = app_config {
        debug!("Loaded app configuration from: {}", AppConfig::config_path()?.display());

        for (ide, path) in &config.paths {
            debug!("Config path override: {} -> {}", ide, path.display());
        }
    } else {
        debug!("No app configuration file found at: {}", AppConfig::config_path()?.display());
    }

    Ok(app_config)
}

fn resolve_home(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = explicit {
        return Ok(home);
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .context("Could not determine home directory; pass --home")
}

fn source_ide(from: Option<Ide>, app_config: &AppConfig) -> Result<Ide> {
    from.or_else(|| app_config.default_from())
        .context("No source IDE given; pass --from or set [default].from in config.toml")
}

fn resolutions_from(
    prefer_source: &[String],
    prefer_target: &[String],
) -> Result<ConflictResolutions> {
    if let Some(name) = prefer_source.iter().find(|name| prefer_target.contains(name)) {
        anyhow::bail!("Server '{name}' given to both --prefer-source and --prefer-target");
    }

    Ok(prefer_source
        .iter()
        .map(|name| (name.clone(), true))
        .chain(prefer_target.iter().map(|name| (name.clone(), false)))
        .collect())
}

fn run_migrate(migrator: &Migrator, app_config: &AppConfig, args: MigrateArgs) -> Result<()> {
    let from = source_ide(args.from, app_config)?;
    let resolutions = resolutions_from(&args.prefer_source, &args.prefer_target)?;
    let backup = !args.no_backup && app_config.default_backup();

    let mut seen = HashSet::new();
    let requests: Vec<MigrationRequest> = args
        .to
        .iter()
        .filter(|to| seen.insert(**to))
        .map(|to| {
            MigrationRequest::new(from.id(), to.id())
                .with_backup(backup)
                .with_dry_run(args.dry_run)
                .with_resolutions(resolutions.clone())
        })
        .collect();

    info!("Migrating MCP servers from {} into {} target(s)", from, requests.len());
    let results = migrator.migrate_all(&requests);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Failed to encode results as JSON")?
        );
    } else {
        for result in &results {
            print_result(result);
        }
    }

    let failed = results.iter().filter(|result| !result.success).count();
    if failed > 0 {
        error!("{failed} of {} migration(s) failed", results.len());
        std::process::exit(1);
    }

    Ok(())
}

fn print_result(result: &MigrationResult) {
    let target = result
        .target_path
        .as_deref()
        .map_or_else(|| result.to_ide.clone(), |path| path.display().to_string());

    if let Some(failure) = &result.error {
        println!(
            "✗ {} -> {}: {} ({})",
            result.from_ide, result.to_ide, failure.detail, failure.kind
        );
        return;
    }

    if result.dry_run {
        println!("Dry run: {} -> {} ({target})", result.from_ide, result.to_ide);
    } else {
        println!("✓ {} -> {} ({target})", result.from_ide, result.to_ide);
    }

    print_names("  Added", &result.added);
    print_names("  Kept", &result.kept);
    for resolved in &result.resolved {
        let side = match resolved.winner {
            Winner::Source => "source definition",
            Winner::Target => "target definition",
        };
        println!("  Conflict: {} (kept {side})", resolved.name);
    }
    if let Some(backup) = &result.backup_path {
        println!("  Backup: {}", backup.display());
    }
}

fn print_names(label: &str, names: &[String]) {
    if !names.is_empty() {
        println!("{label}: {}", names.join(", "));
    }
}

fn run_diff(migrator: &Migrator, app_config: &AppConfig, args: &DiffArgs) -> Result<()> {
    let from = source_ide(args.from, app_config)?;
    let plan = migrator
        .preview(from.id(), args.to.id(), &ConflictResolutions::new())
        .with_context(|| format!("Failed to compare {from} with {}", args.to))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan_to_json(&plan))
                .context("Failed to encode comparison as JSON")?
        );
        return Ok(());
    }

    println!(
        "{} ({}) -> {} ({})",
        from,
        plan.source.path.display(),
        args.to,
        plan.target.path.display()
    );

    if plan.outcome.added.is_empty() && plan.conflicts.is_empty() {
        println!("Nothing to migrate");
    }
    print_names("Would add", &plan.outcome.added);

    for conflict in &plan.conflicts {
        println!("\nConflict: {}", conflict.name);
        println!("  Source: {}", format_value(conflict.source.as_value()));
        println!("  Target: {}", format_value(conflict.target.as_value()));
    }

    for warning in &plan.warnings {
        println!("Warning: {warning}");
    }

    Ok(())
}

fn plan_to_json(plan: &MigrationPlan) -> Value {
    let conflicts: Vec<Value> = plan
        .conflicts
        .iter()
        .map(|conflict| {
            json!({
                "name": conflict.name,
                "source": conflict.source,
                "target": conflict.target,
            })
        })
        .collect();

    json!({
        "from_ide": plan.source.ide,
        "to_ide": plan.target.ide,
        "source_path": plan.source.path,
        "target_path": plan.target.path,
        "added": plan.outcome.added,
        "kept": plan.outcome.kept,
        "conflicts": conflicts,
        "warnings": plan.warnings,
    })
}

/// Format a JSON value for display, indenting nested structures
fn format_value(value: &Value) -> String {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => value.to_string(),
        _ => serde_json::to_string_pretty(value)
            .map_or_else(|_| value.to_string(), |pretty| pretty.replace('\n', "\n  ")),
    }
}

fn run_list(registry: &SchemaRegistry, args: &ListArgs) -> Result<()> {
    if args.json {
        let entries: Vec<Value> = registry
            .schemas()
            .map(|schema| {
                json!({
                    "ide": schema.ide,
                    "path": schema.path,
                    "server_key": schema.server_key,
                    "exists": schema.path.exists(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to encode IDE list as JSON")?
        );
        return Ok(());
    }

    for schema in registry.schemas() {
        println!(
            "{:<15} {}{}",
            schema.ide.id(),
            schema.path.display(),
            existence_marker(&schema.path)
        );
    }

    Ok(())
}

fn existence_marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (not found)"
    }
}
