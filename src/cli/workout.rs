//! Workout log commands

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::Utc;
use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::{CommandContext, LogArgs, OutputFormat};
use crate::error::{Result, StorageError};
use crate::models::WorkoutDisplay;
use crate::output::formatters::format_workout_date;
use crate::output::json::print_json;
use crate::output::table::format_table;
use crate::store::{Candidate, ListView};

/// Log a workout and show the updated list
pub fn log(ctx: &CommandContext, args: LogArgs) -> Result<()> {
    let mut store = ctx.workouts()?;

    let candidate = Candidate {
        kind: args.kind,
        duration: args.duration,
        intensity: args.intensity,
        notes: args.notes,
    };
    let added = store.add(&candidate)?;

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "workout": added.record,
            "saved": added.change.warning.is_none(),
            "list": added.change.view,
        })),
        _ => {
            eprintln!("{} Workout logged successfully! 💪", "✓".green());
            warn_unsaved(added.change.warning.as_ref(), "workout");
            print_view(&added.change.view, ctx.format);
            Ok(())
        }
    }
}

/// Show the most recent workouts
pub fn list(ctx: &CommandContext) -> Result<()> {
    let store = ctx.workouts()?;
    let view = store.view();

    match ctx.format {
        OutputFormat::Json => print_json(&view),
        _ => {
            print_view(&view, ctx.format);
            Ok(())
        }
    }
}

/// Delete a workout by ID
pub fn delete(ctx: &CommandContext, id: &str, yes: bool) -> Result<()> {
    let mut store = ctx.workouts()?;

    if !yes && std::io::stdin().is_terminal() {
        if let Some(record) = store.records().iter().find(|r| r.id == id) {
            eprintln!(
                "{} Delete workout \"{}\" from {}?",
                "⚠".yellow(),
                record.summary(),
                format_workout_date(&record.date)
            );
        }

        let confirm = Confirm::new()
            .with_prompt("Confirm deletion?")
            .default(false)
            .interact()?;

        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.remove(id);

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "deleted": removed.removed,
            "id": id,
            "saved": removed.change.warning.is_none(),
            "list": removed.change.view,
        })),
        _ => {
            if removed.removed {
                eprintln!("{} Workout deleted", "✓".green());
            } else {
                eprintln!("{} No workout with ID {}", "⚠".yellow(), id);
            }
            warn_unsaved(removed.change.warning.as_ref(), "change");
            print_view(&removed.change.view, ctx.format);
            Ok(())
        }
    }
}

/// Write every workout to a CSV file
pub fn export(ctx: &CommandContext, dir: Option<&str>) -> Result<()> {
    let store = ctx.workouts()?;
    let export = store.export(Utc::now())?;

    let dir = dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(&export.filename);
    std::fs::write(&path, &export.contents)?;
    log::debug!("Wrote {} bytes to {}", export.contents.len(), path.display());

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "records": export.records,
        })),
        _ => {
            eprintln!(
                "{} Workouts exported successfully! 📥 ({} records)",
                "✓".green(),
                export.records
            );
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn warn_unsaved(warning: Option<&StorageError>, what: &str) {
    if let Some(e) = warning {
        eprintln!(
            "{} Failed to save {}. Storage may be full. ({})",
            "⚠".yellow(),
            what,
            e
        );
    }
}

fn print_view(view: &ListView, format: OutputFormat) {
    if view.is_empty() {
        println!("No workouts yet. Log your first one!");
        return;
    }

    match format {
        OutputFormat::Table => {
            let rows: Vec<WorkoutDisplay> = view.items.iter().map(WorkoutDisplay::from).collect();
            println!("{}", format_table(&rows, ""));
        }
        _ => {
            for item in &view.items {
                println!(
                    "{}  {}",
                    item.summary.bold(),
                    format_workout_date(&item.date).dimmed()
                );
                if let Some(notes) = &item.notes {
                    println!("   📝 {}", notes);
                }
                println!("   {}", item.id.dimmed());
            }
        }
    }

    if view.hidden > 0 {
        println!(
            "{}",
            format!("… and {} older workouts (see export)", view.hidden).dimmed()
        );
    }
}
