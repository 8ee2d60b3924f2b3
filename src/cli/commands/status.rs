//! Status command - active version and cache summary

use crate::cache::{CacheStorage, DiskStorage};
use crate::config::{Config, ConfigManager};
use crate::error::SwResult;
use crate::worker::ManagerSettings;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[MISSING] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[STALE] ");

/// Execute the status command
pub async fn execute(config: &Config) -> SwResult<()> {
    let settings = ManagerSettings::from_config(config)?;
    let dir = ConfigManager::storage_dir(config);
    let storage = DiskStorage::open_at(&dir).await?;

    println!("{}", style("swcache status").bold().cyan());
    println!();
    println!("{}", style("App:").bold());
    println!("  Origin:  {}", settings.origin);
    println!("  Version: {}", settings.names.version());
    println!("  Storage: {}", dir.display());

    let static_name = settings.names.static_name();
    let dynamic_name = settings.names.dynamic_name();
    let keys = storage.keys().await?;

    println!();
    println!("{}", style("Caches:").bold());
    let installed = keys.contains(&static_name);
    for name in [&static_name, &dynamic_name] {
        if keys.contains(name) {
            let entries = storage.entries(name).await?.len();
            println!("  {}{} ({} entries)", CHECK, name, entries);
        } else {
            println!("  {}{}", CROSS, style(name).dim());
        }
    }
    for name in settings.names.stale(&keys) {
        println!("  {}{}", WARN, style(name).yellow());
    }

    println!();
    if installed {
        println!(
            "{}",
            style(format!("Worker {} is active", settings.names.version()))
                .green()
                .bold()
        );
    } else {
        println!(
            "{} {}",
            style("No active worker.").yellow().bold(),
            style("Run: swcache install").dim()
        );
    }

    Ok(())
}
