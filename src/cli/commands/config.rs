//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_FILE};
use crate::error::{ZaniError, ZaniResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Value type stored under a config key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Str,
    Bool,
    Int,
    Float,
    List,
}

/// Every settable key and its value type
const KEYS: &[(&str, Kind)] = &[
    ("general.log_format", Kind::Str),
    ("general.audit_log", Kind::Bool),
    ("model.name", Kind::Str),
    ("model.api_key_env", Kind::Str),
    ("model.endpoint", Kind::Str),
    ("explicit_cache.min_tokens", Kind::Int),
    ("explicit_cache.ttl_hours", Kind::Int),
    ("explicit_cache.force_percent", Kind::Float),
    ("explicit_cache.force_tokens", Kind::Int),
    ("explicit_cache.recommend_percent", Kind::Float),
    ("explicit_cache.recommend_tokens", Kind::Int),
    ("explicit_cache.critical_files", Kind::List),
    ("workspace.static_ignore", Kind::List),
    ("workspace.max_file_size_kb", Kind::Int),
];

/// A parsed value ready to be written
#[derive(Debug, Clone, PartialEq)]
enum Typed {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl Typed {
    fn parse(kind: Kind, raw: &str) -> ZaniResult<Self> {
        let value = match kind {
            Kind::Str => Self::Str(raw.to_string()),
            Kind::Bool => Self::Bool(parse_bool(raw)?),
            Kind::Int => Self::Int(
                raw.parse()
                    .map_err(|_| ZaniError::User(format!("Invalid number: {}", raw)))?,
            ),
            Kind::Float => Self::Float(
                raw.parse()
                    .map_err(|_| ZaniError::User(format!("Invalid number: {}", raw)))?,
            ),
            Kind::List => Self::List(
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        };
        Ok(value)
    }

    fn to_toml(&self) -> toml::Value {
        match self {
            Self::Str(s) => toml::Value::String(s.clone()),
            Self::Bool(b) => toml::Value::Boolean(*b),
            Self::Int(n) => toml::Value::Integer(*n),
            Self::Float(f) => toml::Value::Float(*f),
            Self::List(items) => {
                toml::Value::Array(items.iter().cloned().map(toml::Value::String).collect())
            }
        }
    }

    fn to_edit(&self) -> toml_edit::Value {
        match self {
            Self::Str(s) => toml_edit::Value::from(s.as_str()),
            Self::Bool(b) => toml_edit::Value::from(*b),
            Self::Int(n) => toml_edit::Value::from(*n),
            Self::Float(f) => toml_edit::Value::from(*f),
            Self::List(items) => {
                toml_edit::Value::Array(items.iter().map(String::as_str).collect())
            }
        }
    }
}

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> ZaniResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            let typed = parse_key_value(&key, &value)?;
            if local {
                set_local_value(&key, &typed).await?
            } else {
                set_value(manager, &key, &typed).await?
            }
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ZaniResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ZaniResult<()> {
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
    ui::step_ok(&ctx, &format!("Configuration initialized at {}", path.display()));
    Ok(())
}

/// Set a key in the global config file only; local overrides are not folded in
async fn set_value(manager: &ConfigManager, key: &str, typed: &Typed) -> ZaniResult<()> {
    let global = manager.load_merged(None).await?;
    let updated = apply(&global, key, typed, manager.path())?;
    manager.save(&updated).await
}

/// Set a key in `.zani.toml` in the current directory, keeping its comments and layout
async fn set_local_value(key: &str, typed: &Typed) -> ZaniResult<()> {
    let cwd = std::env::current_dir().map_err(|e| ZaniError::io("getting current directory", e))?;
    let local_path = cwd.join(LOCAL_CONFIG_FILE);

    let existing = if local_path.exists() {
        fs::read_to_string(&local_path)
            .await
            .map_err(|e| ZaniError::io(format!("reading {}", local_path.display()), e))?
    } else {
        String::new()
    };

    let content = edit_document(&existing, key, typed, &local_path)?;
    fs::write(&local_path, content)
        .await
        .map_err(|e| ZaniError::io(format!("writing {}", local_path.display()), e))
}

fn parse_key_value(key: &str, raw: &str) -> ZaniResult<Typed> {
    let kind = KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            let valid: Vec<&str> = KEYS.iter().map(|(name, _)| *name).collect();
            ZaniError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                valid.join(", ")
            ))
        })?;
    Typed::parse(kind, raw)
}

fn split_key(key: &str) -> ZaniResult<(&str, &str)> {
    key.split_once('.')
        .ok_or_else(|| ZaniError::User(format!("Expected <table>.<key>, got {}", key)))
}

/// Return `config` with `key` replaced, re-validated through the schema
fn apply(config: &Config, key: &str, typed: &Typed, origin: &Path) -> ZaniResult<Config> {
    let (table, leaf) = split_key(key)?;
    let mut tree = toml::Value::try_from(config)?;

    tree.as_table_mut()
        .and_then(|root| root.get_mut(table))
        .and_then(toml::Value::as_table_mut)
        .ok_or_else(|| ZaniError::Internal(format!("config has no [{}] table", table)))?
        .insert(leaf.to_string(), typed.to_toml());

    tree.try_into()
        .map_err(|e: toml::de::Error| ZaniError::ConfigInvalid {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Set `key` in a TOML document, preserving everything else in it
fn edit_document(existing: &str, key: &str, typed: &Typed, origin: &Path) -> ZaniResult<String> {
    let (table, leaf) = split_key(key)?;
    let mut doc: toml_edit::DocumentMut =
        existing
            .parse()
            .map_err(|e: toml_edit::TomlError| ZaniError::ConfigInvalid {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

    doc[table][leaf] = toml_edit::value(typed.to_edit());
    let content = doc.to_string();

    // The edited file must still load as a config overlay
    toml::from_str::<Config>(&content).map_err(|e| ZaniError::ConfigInvalid {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(content)
}

fn parse_bool(value: &str) -> ZaniResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ZaniError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}
