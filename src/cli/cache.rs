//! Cache management commands

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::storage::DB_FILE;
use crate::cache::{DeployStatus, deploy, lock_storage};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::{CacheStatusDisplay, GenerationDisplay};
use crate::output::formatters::{format_size, format_timestamp_local};
use crate::output::json::print_json;
use crate::output::table::format_table;

/// Show cache status/statistics
pub fn status(ctx: &CommandContext) -> Result<()> {
    let storage = ctx.cache_storage()?;
    let stats = lock_storage(&storage)?.stats()?;
    let path = ctx.data_dir.join(DB_FILE).display().to_string();
    let configured = &ctx.config.cache_version;

    match ctx.format {
        OutputFormat::Json => print_json(&CacheStatusDisplay::new(path, configured, &stats)),
        OutputFormat::Table => {
            let rows = GenerationDisplay::from_stats(&stats);
            println!("{}", format_table(&rows, "Cache is empty."));
            Ok(())
        }
        OutputFormat::Pretty => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", path);
            println!("Configured:     {}", configured);

            match stats.active_version.as_deref() {
                Some(active) if active == configured.as_str() => {
                    println!("Active:         {} {}", active, "✓".green())
                }
                Some(active) => println!(
                    "Active:         {} {}",
                    active,
                    "(run 'pitchside cache update')".yellow()
                ),
                None => println!("Active:         {}", "none".dimmed()),
            }

            println!("Entries:        {}", stats.total_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));

            for (name, entries) in &stats.generations {
                println!("  {:<20} {} entries", name, entries);
            }

            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_timestamp_local(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_timestamp_local(newest));
            }
            Ok(())
        }
    }
}

/// Install the configured version and purge the rest
pub async fn update(ctx: &CommandContext) -> Result<()> {
    let settings = ctx.gateway_settings()?;
    let version = settings.cache_name.clone();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Precaching {} assets for {}...",
        settings.precache.len(),
        version
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = deploy(ctx.network()?, ctx.cache_storage()?, settings).await;
    spinner.finish_and_clear();
    let deployment = result?;

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "version": version,
            "serving": deployment.gateway.version(),
            "status": status_json(&deployment.status),
        })),
        _ => {
            match &deployment.status {
                DeployStatus::Current => {
                    println!("{} Cache {} is already active", "✓".green(), version);
                }
                DeployStatus::Activated { precached, purged } => {
                    println!(
                        "{} Activated {} ({} assets precached)",
                        "✓".green(),
                        version,
                        precached
                    );
                    for name in purged {
                        println!("  Deleted old cache {}", name.dimmed());
                    }
                }
                DeployStatus::InstallFailed { reason, serving } => {
                    println!("{} Install of {} failed: {}", "⚠".yellow(), version, reason);
                    println!("  Still serving {}", serving.bold());
                }
            }
            Ok(())
        }
    }
}

fn status_json(status: &DeployStatus) -> serde_json::Value {
    match status {
        DeployStatus::Current => serde_json::json!({ "state": "current" }),
        DeployStatus::Activated { precached, purged } => serde_json::json!({
            "state": "activated",
            "precached": precached,
            "purged": purged,
        }),
        DeployStatus::InstallFailed { reason, serving } => serde_json::json!({
            "state": "install_failed",
            "reason": reason,
            "serving": serving,
        }),
    }
}

/// Clear all cache entries
pub fn clear(ctx: &CommandContext) -> Result<()> {
    let storage = ctx.cache_storage()?;
    let stats = lock_storage(&storage)?.clear_all()?;

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "entries_removed": stats.entries_removed,
            "success": true,
        })),
        _ => {
            if stats.entries_removed > 0 {
                println!("Cleared {} cache entries", stats.entries_removed);
            } else {
                println!("Cache was already empty");
            }
            Ok(())
        }
    }
}

/// Show cache database path
pub fn path(ctx: &CommandContext) -> Result<()> {
    println!("{}", ctx.data_dir.join(DB_FILE).display());
    Ok(())
}
