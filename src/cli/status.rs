//! Status command implementation

use colored::Colorize;

use crate::cache::lock_storage;
use crate::cli::CommandContext;
use crate::config::Config;
use crate::error::Result;
use crate::output::formatters::format_workout_date;

/// Run the status command to display configuration, cache and workout status
pub fn run(ctx: &CommandContext, config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "Pitchside Status".bold());

    let path = Config::resolve_path(config_path)?;
    if path.exists() {
        println!("Config file: {}", path.display().to_string().cyan());
    } else {
        println!(
            "{} No config file at {} (using defaults)",
            "○".dimmed(),
            path.display()
        );
        println!("  → Run 'pitchside init' to configure");
    }
    println!("Data dir:    {}", ctx.data_dir.display().to_string().cyan());
    println!("Origin:      {}", ctx.config.origin);
    println!();

    // Cache status
    let configured = ctx.config.cache_version.as_str();
    let storage = ctx.cache_storage()?;
    let (active, entries) = {
        let storage = lock_storage(&storage)?;
        let active = storage.active_version()?;
        let entries = match &active {
            Some(name) => storage.entry_count(name)?,
            None => 0,
        };
        (active, entries)
    };

    match active.as_deref() {
        Some(name) if name == configured => {
            println!("{} Cache {} active ({} entries)", "✓".green(), name, entries);
        }
        Some(name) => {
            println!(
                "{} Cache {} active, {} configured",
                "⚠".yellow(),
                name,
                configured
            );
            println!("  → Run 'pitchside cache update' to switch");
        }
        None => {
            println!("{} Offline cache not installed", "○".dimmed());
            println!("  → Run 'pitchside cache update' to precache the site");
        }
    }

    // Workout status
    let store = ctx.workouts()?;
    match store.records().first() {
        Some(latest) => println!(
            "{} {} workouts logged (latest {})",
            "✓".green(),
            store.len(),
            format_workout_date(&latest.date)
        ),
        None => println!("{} No workouts logged yet", "○".dimmed()),
    }

    println!();
    Ok(())
}
