//! Pitchside CLI - football training log with an offline-first asset cache

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod store;

use cli::{CacheCommands, Cli, CommandContext, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    // Answers `COMPLETE=<shell> pitchside` requests and exits
    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
    log::debug!("Debug logging enabled");
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts),
        Commands::Version => {
            println!("pitchside version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "pitchside",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        Commands::Status => {
            let ctx = CommandContext::new(&opts)?;
            cli::status::run(&ctx, opts.config_ref())
        }
        Commands::Log(args) => cli::workout::log(&CommandContext::new(&opts)?, args),
        Commands::List => cli::workout::list(&CommandContext::new(&opts)?),
        Commands::Delete { id, yes } => {
            cli::workout::delete(&CommandContext::new(&opts)?, &id, yes)
        }
        Commands::Export { dir } => {
            cli::workout::export(&CommandContext::new(&opts)?, dir.as_deref())
        }
        Commands::Fetch(args) => cli::fetch::run(&CommandContext::new(&opts)?, args).await,
        Commands::Cache(cache_cmd) => {
            let ctx = CommandContext::new(&opts)?;
            match cache_cmd {
                CacheCommands::Status => cli::cache::status(&ctx),
                CacheCommands::Update => cli::cache::update(&ctx).await,
                CacheCommands::Clear => cli::cache::clear(&ctx),
                CacheCommands::Path => cli::cache::path(&ctx),
            }
        }
    }
}
