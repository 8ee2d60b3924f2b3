//! Cache command - inspect and clear cache stores

use crate::cache::{CacheNames, CacheStorage, CacheVersion, DiskStorage};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::SwResult;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SwResult<()> {
    let storage = DiskStorage::open_at(ConfigManager::storage_dir(config)).await?;
    let names = CacheNames::new(
        config.app.cache_prefix.clone(),
        CacheVersion::new(config.app.version.clone()),
    );

    match args.action {
        CacheAction::List { format } => list_caches(&storage, &names, format).await,
        CacheAction::Show { name } => show_cache(&storage, &name).await,
        CacheAction::Clear { stale, yes } => clear_caches(&storage, &names, stale, yes).await,
    }
}

#[derive(Serialize)]
struct CacheSummary {
    name: String,
    entries: usize,
    bytes: u64,
    current: bool,
}

async fn summarize(storage: &DiskStorage, names: &CacheNames) -> SwResult<Vec<CacheSummary>> {
    let mut summaries = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entry_metadata(&name).await?;
        summaries.push(CacheSummary {
            entries: entries.len(),
            bytes: entries.values().map(|meta| meta.size).sum(),
            current: names.is_current(&name),
            name,
        });
    }
    Ok(summaries)
}

/// List every cache in creation order
async fn list_caches(
    storage: &DiskStorage,
    names: &CacheNames,
    format: OutputFormat,
) -> SwResult<()> {
    let caches = summarize(storage, names).await?;

    if caches.is_empty() && format != OutputFormat::Json {
        println!("No caches found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_cache_table(&caches),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&caches)?),
        OutputFormat::Plain => {
            for cache in &caches {
                println!("{}", cache.name);
            }
        }
    }

    Ok(())
}

fn print_cache_table(caches: &[CacheSummary]) {
    println!("{:<32} {:>8} {:>12} {:<8}", "CACHE", "ENTRIES", "BYTES", "STATE");
    println!("{}", "-".repeat(64));

    for cache in caches {
        let state = if cache.current {
            style("current").green().to_string()
        } else {
            style("stale").yellow().to_string()
        };
        println!(
            "{:<32} {:>8} {:>12} {:<8}",
            cache.name, cache.entries, cache.bytes, state
        );
    }

    println!();
    println!("Total: {} cache(s)", caches.len());
}

/// Show the entries of one cache
async fn show_cache(storage: &DiskStorage, name: &str) -> SwResult<()> {
    let entries = storage.entry_metadata(name).await?;

    println!("{}", style(name).bold());
    if entries.is_empty() {
        println!("  (empty)");
        return Ok(());
    }
    for (key, meta) in &entries {
        println!(
            "  {:<56} {:>4} {:>10}  {}",
            key,
            meta.status,
            meta.size,
            style(meta.stored_at.format("%Y-%m-%d %H:%M:%S")).dim()
        );
    }
    println!();
    println!("Total: {} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
    Ok(())
}

/// Delete every cache, or only stale ones
async fn clear_caches(
    storage: &DiskStorage,
    names: &CacheNames,
    stale_only: bool,
    yes: bool,
) -> SwResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let all = storage.keys().await?;
    let targets: Vec<String> = if stale_only {
        names.stale(&all).into_iter().cloned().collect()
    } else {
        all
    };

    if targets.is_empty() {
        ui::step_info(&ctx, "No caches to delete");
        return Ok(());
    }

    let prompt = format!("Delete {} cache(s)?", targets.len());
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Nothing deleted", "Pass --yes to skip the prompt");
        return Ok(());
    }

    let mut deleted = 0;
    for name in &targets {
        if storage.delete(name).await? {
            deleted += 1;
            ui::step_ok_detail(&ctx, "Deleted", name);
        }
    }
    ui::outro_success(&ctx, &format!("Deleted {} cache(s)", deleted));
    Ok(())
}
