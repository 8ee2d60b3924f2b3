//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_FILE};
use crate::error::{SwError, SwResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;
use toml_edit::{value, Array, DocumentMut, InlineTable, Item, Table};

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> SwResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            let path = if local {
                std::env::current_dir()
                    .map_err(|e| SwError::io("getting current directory", e))?
                    .join(LOCAL_CONFIG_FILE)
            } else {
                manager.path().to_path_buf()
            };
            set_value(&path, &key, &value).await?
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> SwResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> SwResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Text,
    Integer,
    Boolean,
    List,
    /// A status code or a placeholder path
    ImageFallback,
}

/// Keys settable from the command line, with their value type
const SETTABLE_KEYS: &[(&str, KeyKind)] = &[
    ("general.log_format", KeyKind::Text),
    ("app.origin", KeyKind::Text),
    ("app.cache_prefix", KeyKind::Text),
    ("app.version", KeyKind::Text),
    ("app.static_assets", KeyKind::List),
    ("policy.lookup", KeyKind::Text),
    ("policy.document_fallback", KeyKind::Text),
    ("policy.image_fallback", KeyKind::ImageFallback),
    ("policy.offline_status", KeyKind::Integer),
    ("policy.offline_body", KeyKind::Text),
    ("notifications.default_title", KeyKind::Text),
    ("notifications.default_body", KeyKind::Text),
    ("notifications.icon", KeyKind::Text),
    ("notifications.badge", KeyKind::Text),
    ("notifications.open_url", KeyKind::Text),
    ("registration.script_url", KeyKind::Text),
    ("registration.scope", KeyKind::Text),
    ("registration.update_via_cache", KeyKind::Text),
    ("registration.clean_existing", KeyKind::Boolean),
    ("registration.delay_ms", KeyKind::Integer),
    ("network.timeout_secs", KeyKind::Integer),
    ("network.max_body_bytes", KeyKind::Integer),
    ("storage.dir", KeyKind::Text),
];

fn key_kind(key: &str) -> SwResult<KeyKind> {
    SETTABLE_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| SwError::ConfigKey(key.to_string()))
}

/// Set `key` in the TOML file at `path`, keeping the rest of the file's
/// formatting and comments intact.
async fn set_value(path: &Path, key: &str, raw: &str) -> SwResult<()> {
    let ctx = UiContext::detect();
    let kind = key_kind(key)?;

    let content = if path.exists() {
        fs::read_to_string(path)
            .await
            .map_err(|e| SwError::io(format!("reading {}", path.display()), e))?
    } else {
        String::new()
    };
    let mut doc: DocumentMut = content.parse()?;
    set_in_document(&mut doc, key, parse_item(kind, raw)?)?;

    let updated = doc.to_string();
    toml::from_str::<Config>(&updated)
        .map_err(|e| SwError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SwError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    fs::write(path, updated)
        .await
        .map_err(|e| SwError::io(format!("writing {}", path.display()), e))?;

    ui::step_ok(
        &ctx,
        &format!("Set {} = {} in {}", key, raw, path.display()),
    );
    Ok(())
}

fn parse_item(kind: KeyKind, raw: &str) -> SwResult<Item> {
    Ok(match kind {
        KeyKind::Text => value(raw),
        KeyKind::Integer => value(
            raw.parse::<i64>()
                .map_err(|_| SwError::User(format!("Invalid number: {}", raw)))?,
        ),
        KeyKind::Boolean => value(parse_bool(raw)?),
        KeyKind::List => {
            let items: Array = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            value(items)
        }
        KeyKind::ImageFallback => {
            let mut table = InlineTable::new();
            match raw.parse::<i64>() {
                Ok(status) => table.insert("status", status.into()),
                Err(_) => table.insert("placeholder", raw.into()),
            };
            value(table)
        }
    })
}

fn set_in_document(doc: &mut DocumentMut, key: &str, item: Item) -> SwResult<()> {
    let (section, leaf) = key
        .split_once('.')
        .ok_or_else(|| SwError::ConfigKey(key.to_string()))?;

    let table = doc
        .entry(section)
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .ok_or_else(|| SwError::User(format!("Expected [{}] to be a table", section)))?;
    table[leaf] = item;
    Ok(())
}

fn parse_bool(value: &str) -> SwResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SwError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageFallback;
    use tempfile::TempDir;

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(key_kind("vm.name"), Err(SwError::ConfigKey(_))));
        assert_eq!(key_kind("app.static_assets").unwrap(), KeyKind::List);
    }

    #[test]
    fn set_keeps_comments() {
        let mut doc: DocumentMut = "# my app\n[app]\nversion = \"v1\" # bump me\n"
            .parse()
            .unwrap();
        set_in_document(&mut doc, "app.cache_prefix", value("site")).unwrap();
        set_in_document(&mut doc, "network.timeout_secs", value(5i64)).unwrap();

        let out = doc.to_string();
        assert!(out.contains("# my app"));
        assert!(out.contains("# bump me"));
        assert!(out.contains("cache_prefix = \"site\""));
        assert!(out.contains("[network]"));
    }

    #[test]
    fn list_values_split_on_commas() {
        let item = parse_item(KeyKind::List, "/, /app.js ,,/style.css").unwrap();
        let array = item.as_array().unwrap();
        let values: Vec<&str> = array.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(values, vec!["/", "/app.js", "/style.css"]);
    }

    #[tokio::test]
    async fn set_value_writes_valid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        set_value(&path, "app.version", "v3").await.unwrap();
        set_value(&path, "registration.clean_existing", "yes").await.unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.app.version, "v3");
        assert!(config.registration.clean_existing);
    }

    #[tokio::test]
    async fn set_image_fallback_status_or_placeholder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        set_value(&path, "policy.image_fallback", "408").await.unwrap();
        let config = ConfigManager::with_path(path.clone()).load().await.unwrap();
        assert_eq!(config.policy.image_fallback, ImageFallback::Status(408));

        set_value(&path, "policy.image_fallback", "/offline.svg").await.unwrap();
        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(
            config.policy.image_fallback,
            ImageFallback::Placeholder("/offline.svg".to_string())
        );
    }

    #[tokio::test]
    async fn set_value_rejects_empty_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let err = set_value(&path, "app.version", "").await.unwrap_err();
        assert!(matches!(err, SwError::ConfigValue { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn set_value_rejects_invalid_enum() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let err = set_value(&path, "policy.lookup", "random").await.unwrap_err();
        assert!(matches!(err, SwError::ConfigInvalid { .. }));
        assert!(!path.exists());
    }
}
