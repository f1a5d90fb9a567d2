use super::prompts;
use super::ui::is_interactive;
use crate::output::Output;
use color_eyre::Result;
use popcorn_config::{Config, PathManager};
use popcorn_core::{FileStore, WatchedStore};
use std::sync::Arc;

pub fn run_clear(watched: bool, yes: bool, output: &Output) -> Result<()> {
    if !watched {
        output.warn("No clear option specified. Use --watched");
        output.println("\nExample: popcorn clear --watched");
        return Ok(());
    }

    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let store = Arc::new(FileStore::new(&path_manager.store_dir()));
    let mut list = WatchedStore::with_key(store, &config.storage.watched_key);

    if list.is_empty() {
        output.info("Watched list is already empty");
        return Ok(());
    }

    if !yes {
        if !is_interactive() {
            return Err(color_eyre::eyre::eyre!("Refusing to clear without confirmation; pass --yes"));
        }
        let prompt = format!("Delete all {} movies from your watched list?", list.len());
        if !prompts::prompt_yes_no(&prompt, false)? {
            output.info("Cancelled");
            return Ok(());
        }
    }

    let count = list.len();
    list.clear()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to clear watched list: {}", e))?;
    output.success(format!("Removed {} movies from your watched list", count));
    Ok(())
}
