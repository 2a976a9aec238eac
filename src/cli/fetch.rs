//! Fetch command: load a site resource through the offline cache

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use reqwest::Method;

use crate::cache::{DeployStatus, Intercept, ResponseSource, Served, deploy};
use crate::cli::{CommandContext, FetchArgs, OutputFormat};
use crate::client::{HttpNetwork, Network, Request};
use crate::error::{Error, Result};
use crate::models::FetchDisplay;
use crate::output::json::print_json;
use crate::output::table::format_table;

/// Run the fetch command
pub async fn run(ctx: &CommandContext, args: FetchArgs) -> Result<()> {
    let settings = ctx.gateway_settings()?;
    let url = settings.resolve(&args.target)?;
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| Error::Other(format!("Invalid HTTP method: {}", args.method)))?;

    let request = if args.navigate {
        Request::navigate(url)
    } else {
        Request::get(url)
    }
    .with_method(method);

    let network = ctx.network()?;
    if !settings.intercepts(&request) {
        log::debug!("{} {} bypasses the cache", request.method, request.url);
        let served = direct(&network, &request).await?;
        return report(ctx.format, request.url.as_str(), &served, args.output.as_deref());
    }
    let storage = ctx.cache_storage()?;

    let served = match deploy(network.clone(), storage, settings).await {
        Ok(deployment) => {
            if let DeployStatus::InstallFailed { reason, serving } = &deployment.status {
                eprintln!(
                    "{} Cache update failed, still serving {}: {}",
                    "⚠".yellow(),
                    serving,
                    reason
                );
            }

            let served = match deployment.gateway.handle(&request).await {
                Intercept::Respond(served) => served,
                Intercept::Passthrough => direct(&network, &request).await?,
            };
            // Let the background refresh land before the process exits
            deployment.gateway.settle().await;
            served
        }
        Err(e) => {
            log::warn!("Offline cache unavailable: {}", e);
            eprintln!("{} Offline cache unavailable: {}", "⚠".yellow(), e);
            direct(&network, &request).await?
        }
    };

    report(ctx.format, request.url.as_str(), &served, args.output.as_deref())
}

/// Fetch without the cache; transport errors are surfaced
async fn direct(network: &Arc<HttpNetwork>, request: &Request) -> Result<Served> {
    let response = network.fetch(request).await?;
    Ok(Served {
        response,
        source: ResponseSource::Network,
    })
}

fn report(format: OutputFormat, url: &str, served: &Served, output: Option<&str>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, &served.response.body)?;
        log::debug!("Wrote {} bytes to {}", served.response.body.len(), path);
    }

    let display = FetchDisplay::new(url, served);

    match format {
        OutputFormat::Json => {
            let display = if output.is_none() {
                display.with_body(served)
            } else {
                display
            };
            print_json(&display)
        }
        OutputFormat::Table => {
            println!("{}", format_table(&[display], ""));
            Ok(())
        }
        OutputFormat::Pretty => {
            let status = format!("{} {}", served.response.status, served.response.status_text);
            let status = if served.response.is_ok() {
                status.green()
            } else {
                status.yellow()
            };
            eprintln!("{} ({})", status, served.source.as_str().dimmed());

            if output.is_none() {
                std::io::stdout().write_all(&served.response.body)?;
                std::io::stdout().flush()?;
            }
            Ok(())
        }
    }
}
