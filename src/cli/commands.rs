use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use log::{error, info};

use crate::config::Config;
use crate::handlers;
use crate::models::{self, Snippet, SnippetStore};
use crate::ui::highlight;

fn open_store(config: &Config) -> Result<SnippetStore> {
    SnippetStore::open(&config.data_file, config.durability()).with_context(|| {
        format!(
            "Failed to load snippets from {}",
            config.data_file.display()
        )
    })
}

/// Runs the web app until Ctrl-C, then flushes the store
pub fn serve(config: &Config) -> Result<()> {
    let store = Arc::new(open_store(config)?);
    let addr = config.listen_addr();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        let shutdown = shutdown_signal(tokio::signal::ctrl_c());

        handlers::serve(listener, store, shutdown)
            .await
            .context("Web server failed")
    })
}

/// Resolves once `signal` fires. If the handler could not be installed the server keeps
/// running instead of stopping right after bind.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            error!("cannot listen for Ctrl-C, graceful shutdown disabled: {err}");
            std::future::pending::<()>().await;
        }
    }
}

/// Lists every snippet in insertion order
pub fn list_snippets(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let snippets = store.all();

    if snippets.is_empty() {
        println!("{}  No snippets stored yet.", "┃".bright_magenta());
        return Ok(());
    }

    println!(
        "{}  {} snippets in {}",
        "┃".bright_magenta(),
        snippets.len(),
        store.path().display().to_string().bright_black()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    for snippet in &snippets {
        println!(
            "{}  {} {}",
            "┃".bright_magenta(),
            format!("#{:<4}", snippet.id).bright_yellow(),
            snippet.title.bright_white().bold()
        );
        if !snippet.description.is_empty() {
            println!(
                "{}        {}",
                "┃".bright_magenta(),
                snippet.description.bright_black().italic()
            );
        }
    }

    Ok(())
}

/// Shows one snippet with highlighted CSS
pub fn show_snippet(config: &Config, id: u64) -> Result<()> {
    let store = open_store(config)?;

    match store.get(id) {
        Some(snippet) => display_snippet(&snippet),
        None => {
            println!("{}  Snippet not found with ID: {}", "┃".bright_magenta(), id);
            let available: Vec<String> = store
                .all()
                .iter()
                .take(10)
                .map(|snippet| format!("#{} {}", snippet.id, snippet.title))
                .collect();
            if !available.is_empty() {
                println!("{}  Available snippets:", "┃".bright_magenta());
                for entry in available {
                    println!("{}  {}", "┃".bright_magenta(), entry.bright_white());
                }
            }
        }
    }

    Ok(())
}

fn display_snippet(snippet: &Snippet) {
    println!(
        "{}  {} {}",
        "┃".bright_magenta(),
        "SNIPPET".bright_green().bold(),
        snippet.title.bold()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    if !snippet.description.is_empty() {
        println!(
            "{}  {}: {}",
            "┃".bright_magenta(),
            "Description".bright_cyan(),
            snippet.description
        );
    }
    println!(
        "{}  {}: {}",
        "┃".bright_magenta(),
        "ID".bright_black(),
        snippet.id
    );
    println!("{}", "─".repeat(60).bright_magenta());

    let highlighted = highlight::css_to_terminal(&snippet.code);
    for line in highlighted.lines() {
        println!("{}  {}", "┃".bright_magenta(), line);
    }
}

pub fn export_snippets(config: &Config, path: &Path) -> Result<()> {
    let store = open_store(config)?;
    let count = models::export_to_file(&store, path)?;
    println!(
        "{}  Exported {} snippets to {}",
        "┃".bright_magenta(),
        count.to_string().bright_yellow(),
        path.display()
    );
    Ok(())
}

pub fn import_snippets(config: &Config, path: &Path) -> Result<()> {
    let store = open_store(config)?;
    let snippets = models::import_file(path)?;
    let total = snippets.len();
    let added = models::merge_import(&store, snippets)?;
    println!(
        "{}  Imported {} of {} snippets from {}",
        "┃".bright_magenta(),
        added.to_string().bright_yellow(),
        total,
        path.display()
    );
    Ok(())
}

/// Backs up to `dir`, or to a `backups` directory next to the snippet file
pub fn backup_snippets(config: &Config, dir: Option<&Path>) -> Result<()> {
    let store = open_store(config)?;
    let backup_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config
            .data_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("backups"),
    };
    let backup_file = models::backup(&store, &backup_dir)?;
    println!(
        "{}  Backup written to {}",
        "┃".bright_magenta(),
        backup_file.display().to_string().bright_green()
    );
    Ok(())
}
