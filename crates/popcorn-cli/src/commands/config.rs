use super::prompts;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_config::{Config, CredentialStore, PathManager, DEMO_API_KEY};
use serde_json::json;

pub fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output),
        crate::ConfigCommands::ApiKey { key } => configure_api_key(key, output),
        crate::ConfigCommands::Init { force } => init_config(force, output),
    }
}

/// Where the effective API key comes from
fn key_source(cred_store: &CredentialStore) -> &'static str {
    if std::env::var("OMDB_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        "environment (OMDB_API_KEY)"
    } else if cred_store.get_omdb_api_key().is_some() {
        "credentials file"
    } else {
        "public demo key"
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let api_key = cred_store.resolve_omdb_api_key();
    let api_key_display = if full { api_key.clone() } else { mask_string(&api_key) };

    if !output.is_human() {
        output.json(&json!({
            "type": "config",
            "config_file": config_file.display().to_string(),
            "config_file_exists": config_file.exists(),
            "store_dir": path_manager.store_dir().display().to_string(),
            "omdb": {
                "base_url": config.omdb.base_url,
                "http_timeout_secs": config.omdb.http_timeout_secs,
                "api_key": api_key_display,
                "api_key_source": key_source(&cred_store),
            },
            "storage": { "watched_key": config.storage.watched_key },
            "ui": {
                "default_title": config.ui.default_title,
                "set_terminal_title": config.ui.set_terminal_title,
            },
        }));
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {} (using defaults)", config_file.display()));
        output.info("Write one with 'popcorn config init'.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
    table.add_row(vec![Cell::new("Store directory"), Cell::new(path_manager.store_dir().display())]);
    table.add_row(vec![Cell::new("OMDb base URL"), Cell::new(&config.omdb.base_url)]);
    table.add_row(vec![Cell::new("HTTP timeout"), Cell::new(format!("{}s", config.omdb.http_timeout_secs))]);
    table.add_row(vec![
        Cell::new("API key"),
        Cell::new(format!("{} ({})", api_key_display, key_source(&cred_store))),
    ]);
    table.add_row(vec![Cell::new("Watched list key"), Cell::new(&config.storage.watched_key)]);
    table.add_row(vec![Cell::new("Default title"), Cell::new(&config.ui.default_title)]);
    table.add_row(vec![
        Cell::new("Terminal title"),
        Cell::new(if config.ui.set_terminal_title { "✓".green().to_string() } else { "✗".red().to_string() }),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.println(table.to_string());

    if api_key == DEMO_API_KEY {
        output.println(
            "Using the shared demo key; get your own at https://www.omdbapi.com/apikey.aspx"
                .bright_black()
                .to_string(),
        );
    }
    Ok(())
}

fn configure_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directory: {}", e))?;

    let key = match key {
        Some(k) => k,
        None => prompts::prompt_password("OMDb API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("API key cannot be empty"));
    }

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    cred_store.set_omdb_api_key(key);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success(format!("API key saved to {}", credentials_file.display()));
    if std::env::var("OMDB_API_KEY").is_ok() {
        output.warn("OMDB_API_KEY is set in the environment and takes precedence over the stored key");
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directory: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("a4954f1c"), "a4****1c");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string(""), "");
    }
}
