//! Fetch command - send a request through the active worker

use crate::cli::args::FetchArgs;
use crate::cli::runtime::{NetworkMode, Runtime};
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::fetch::{Destination, Request, Response, ResponseSource};
use crate::worker::FetchOutcome;
use console::style;
use std::io::Write;
use tokio::fs;
use tracing::debug;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SwResult<()> {
    let mode = if args.offline {
        NetworkMode::Offline
    } else {
        NetworkMode::Online
    };
    let runtime = Runtime::open(config, mode).await?;
    let worker = runtime.active_worker(config).await?;

    let request = Request::parse(&args.target, &runtime.settings.origin)?;
    let destination = args
        .destination
        .unwrap_or_else(|| Destination::infer(&request.url));
    let request = request
        .with_method(args.method)
        .with_destination(destination);

    let outcome = runtime.registry.handle_fetch(request.clone()).await;
    let (response, source) = match outcome {
        FetchOutcome::Respond { response, source } => (response, source),
        FetchOutcome::Passthrough => {
            debug!("Not intercepted, going to the network");
            (runtime.network.fetch(&request).await?, ResponseSource::Network)
        }
    };

    // Let the dynamic-cache write land before the process exits
    worker.manager().settle().await;

    print_summary(&request, &response, &source);
    match args.output {
        Some(path) => fs::write(&path, &response.body)
            .await
            .map_err(|e| SwError::io(format!("writing {}", path.display()), e))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| SwError::io("writing response body", e))?;
        }
    }
    Ok(())
}

fn print_summary(request: &Request, response: &Response, source: &ResponseSource) {
    let status = format!("{} {}", response.status, response.status_text);
    let status = if response.is_success() {
        style(status).green()
    } else {
        style(status).yellow()
    };
    eprintln!(
        "{} {} {} {}",
        style(request.method).bold(),
        request.url,
        status,
        style(format!("({})", source)).dim()
    );
}
