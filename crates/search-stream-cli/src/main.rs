//! `search-stream`: submit searches and follow their progress live.

mod cli;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use search_stream_client::observability::init_observability;
use search_stream_client::prelude::*;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, info};

use crate::cli::{Cli, OutputFormat};
use crate::output::Emit;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_observability("info");

    let config = cli.apply(ClientConfig::from_env()?);
    config.validate()?;
    let source = Arc::new(HttpEventSource::new(&config).context("failed to build HTTP client")?);
    info!(url = source.search_url(), "search stream client ready");

    match cli.output {
        OutputFormat::Plain => {
            let view = TerminalView::new(std::io::stdout());
            let controller =
                StreamSearchController::new(source, config, view).show_statistics(cli.stats);
            run(controller, &cli).await
        }
        OutputFormat::Html => {
            let controller = StreamSearchController::new(source, config, HtmlView::new())
                .show_statistics(cli.stats);
            run(controller, &cli).await
        }
    }
}

async fn run<V: Emit>(mut controller: StreamSearchController<V>, cli: &Cli) -> Result<()> {
    if let Some(max_attempts) = &cli.max_attempts {
        controller.form_mut().set_max_attempts(max_attempts.clone());
    }
    match &cli.query {
        Some(query) => one_shot(&mut controller, query).await,
        None => interactive(&mut controller).await,
    }
}

async fn one_shot<V: Emit>(controller: &mut StreamSearchController<V>, query: &str) -> Result<()> {
    controller.form_mut().set_query(query);
    let submitted = controller.on_key(Key::Enter);
    controller.view_mut().emit_alerts();
    if submitted.is_none() {
        bail!("search was not submitted");
    }
    controller.run_until_idle().await;
    controller.view_mut().emit_results();
    Ok(())
}

/// Each stdin line is typed into the query input followed by Enter. A new
/// line while a search is streaming supersedes it.
async fn interactive<V: Emit>(controller: &mut StreamSearchController<V>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                controller.form_mut().set_query(line);
                controller.on_key(Key::Enter);
                controller.view_mut().emit_alerts();
            }
            Some(message) = controller.next_message() => {
                let current = controller.active_session() == Some(message.session_id);
                controller.handle_message(message);
                if current && !controller.is_streaming() {
                    controller.view_mut().emit_results();
                }
            }
        }
    }

    if controller.is_streaming() {
        debug!("stdin closed, waiting for the running search");
        controller.run_until_idle().await;
        controller.view_mut().emit_results();
    }
    Ok(())
}
