//! Daynote command line caller
//!
//! Thin glue around the `daynote-core` engine: it builds a kernel client
//! from the command line, loads default settings, and dispatches one
//! engine operation per invocation.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use daynote_core::models::{Notebook, Settings};
use daynote_core::services::{
    load_notebooks_with_retry, relocate_into_diary, resolve_diary, sync_window, RenderVariant,
    TimeWindow,
};
use daynote_core::store::{DocStore, InsertPosition, KernelClient};

#[derive(Parser)]
#[command(name = "daynote", about = "Daily note and reservation sync for a block document store")]
struct Cli {
    /// Kernel endpoint
    #[arg(long, default_value = "http://127.0.0.1:6806")]
    server: String,

    /// Kernel API token
    #[arg(long, env = "DAYNOTE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List notebooks with their resolved daily note paths
    Notebooks,
    /// Resolve (creating if needed) today's daily note and print its ID
    Open {
        /// Notebook ID; defaults to the first discovered notebook
        #[arg(long)]
        notebook: Option<String>,
    },
    /// Move a block (and its logical children) into today's daily note
    Move {
        block_id: String,
        /// Notebook ID; defaults to the first discovered notebook
        #[arg(long)]
        notebook: Option<String>,
    },
    /// Sync reservations into a document
    Sync {
        doc_id: String,
        /// Rendering variant: embed, link or ref
        #[arg(long, default_value = "embed")]
        variant: String,
        /// Insertion position for a new block: top or bottom
        #[arg(long, default_value = "bottom")]
        position: String,
        /// Time window: today, future, or a day offset like +7
        #[arg(long, default_value = "today")]
        window: String,
    },
}

fn parse_position(value: &str) -> Result<InsertPosition> {
    match value {
        "top" => Ok(InsertPosition::Top),
        "bottom" => Ok(InsertPosition::Bottom),
        other => bail!("unknown position '{other}' (expected top or bottom)"),
    }
}

fn parse_window(value: &str) -> Result<TimeWindow> {
    match value {
        "today" => Ok(TimeWindow::Today),
        "future" => Ok(TimeWindow::Future),
        offset => offset
            .parse::<i64>()
            .map(TimeWindow::DaysAhead)
            .map_err(|_| anyhow!("unknown window '{offset}' (expected today, future or a day offset)")),
    }
}

async fn pick_notebook(
    store: &dyn DocStore,
    settings: &Settings,
    wanted: Option<&str>,
) -> Result<Notebook> {
    let notebooks = load_notebooks_with_retry(store, settings).await;
    if notebooks.is_empty() {
        bail!("no notebooks available; is the kernel running?");
    }
    let wanted = wanted.or(settings.default_notebook.as_deref());
    match wanted {
        Some(id) => notebooks
            .into_iter()
            .find(|nb| nb.id == id)
            .ok_or_else(|| anyhow!("notebook '{id}' not found")),
        None => notebooks
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no notebooks available")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = KernelClient::new(cli.server.clone(), cli.token.clone());
    let settings = Settings::default();
    debug!(server = %cli.server, "connecting to kernel");

    match cli.command {
        Command::Notebooks => {
            let notebooks = load_notebooks_with_retry(&store, &settings).await;
            for notebook in notebooks {
                println!("{}\t{}\t{}", notebook.id, notebook.name, notebook.dailynote_path);
            }
        }
        Command::Open { notebook } => {
            let notebook = pick_notebook(&store, &settings, notebook.as_deref()).await?;
            let doc_id = resolve_diary(&store, &notebook)
                .await
                .with_context(|| format!("resolving daily note for '{}'", notebook.name))?;
            println!("{doc_id}");
            println!("siyuan://blocks/{doc_id}");
        }
        Command::Move { block_id, notebook } => {
            let notebook = pick_notebook(&store, &settings, notebook.as_deref()).await?;
            let root_id = relocate_into_diary(&store, &settings, &block_id, &notebook)
                .await
                .with_context(|| format!("moving block '{block_id}'"))?;
            println!("{root_id}");
        }
        Command::Sync {
            doc_id,
            variant,
            position,
            window,
        } => {
            let variant: RenderVariant = variant.parse()?;
            let position = parse_position(&position)?;
            let window = parse_window(&window)?;
            sync_window(&store, variant, position, window, &doc_id)
                .await
                .with_context(|| format!("syncing reservations into '{doc_id}'"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parsing_accepts_named_and_offset_forms() {
        assert_eq!(parse_window("today").unwrap(), TimeWindow::Today);
        assert_eq!(parse_window("future").unwrap(), TimeWindow::Future);
        assert_eq!(parse_window("+7").unwrap(), TimeWindow::DaysAhead(7));
        assert_eq!(parse_window("-3").unwrap(), TimeWindow::DaysAhead(-3));
        assert!(parse_window("sometime").is_err());
    }

    #[test]
    fn position_parsing_rejects_unknown_values() {
        assert_eq!(parse_position("top").unwrap(), InsertPosition::Top);
        assert_eq!(parse_position("bottom").unwrap(), InsertPosition::Bottom);
        assert!(parse_position("middle").is_err());
    }
}
