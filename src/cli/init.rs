//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::cli::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for the site origin and cache version, keeping any values from an
/// existing config file as defaults.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to pitchside!".bold().green());
    println!("Let's set up your training tracker.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    let theme = ColorfulTheme::default();

    let origin: String = Input::with_theme(&theme)
        .with_prompt("Tracker site origin")
        .default(config.origin.clone())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            match reqwest::Url::parse(input) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
                Ok(_) => Err("Origin must use http or https".to_string()),
                Err(e) => Err(format!("Invalid URL: {}", e)),
            }
        })
        .interact_text()?;

    let cache_version: String = Input::with_theme(&theme)
        .with_prompt("Cache version")
        .default(config.cache_version.clone())
        .interact_text()?;

    let set_timeout = Confirm::with_theme(&theme)
        .with_prompt("Limit how long network requests may take?")
        .default(config.request_timeout_secs.is_some())
        .interact()?;

    config.request_timeout_secs = if set_timeout {
        let secs: u64 = Input::with_theme(&theme)
            .with_prompt("Timeout in seconds")
            .default(config.request_timeout_secs.unwrap_or(10))
            .interact_text()?;
        Some(secs)
    } else {
        None
    };

    config.origin = origin;
    config.cache_version = cache_version;
    config.validate()?;
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    println!("  Origin: {}", config.origin.bold());
    println!("  Cache version: {}", config.cache_version.bold());

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Precache the site for offline use", "pitchside cache update".cyan());
    println!(
        "  {} - Log a workout",
        "pitchside log --type cardio --duration 30 --intensity 7".cyan()
    );

    Ok(())
}
