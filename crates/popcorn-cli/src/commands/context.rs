use crate::commands::ui::is_interactive;
use crate::terminal_title::TerminalTitle;
use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager, DEMO_API_KEY};
use popcorn_core::{DocumentTitle, FileStore, KeyDispatcher, KeyValueStore, Session, TitleSurface, WatchedStore};
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, built from config, credentials and paths
pub struct AppContext {
    pub config: Config,
    pub paths: PathManager,
    pub source: Arc<dyn MovieSource>,
    pub store: Arc<dyn KeyValueStore>,
    pub title: Arc<dyn TitleSurface>,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let credentials_file = paths.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        let api_key = cred_store.resolve_omdb_api_key();
        if api_key == DEMO_API_KEY {
            tracing::debug!("No OMDb API key configured, using the public demo key");
        }

        let source: Arc<dyn MovieSource> = Arc::new(OmdbClient::new(
            api_key,
            config.omdb.base_url.clone(),
            Duration::from_secs(config.omdb.http_timeout_secs),
        ));
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&paths.store_dir()));

        let default_title = config.ui.default_title.clone();
        let title: Arc<dyn TitleSurface> = if config.ui.set_terminal_title && is_interactive() {
            Arc::new(TerminalTitle::new(default_title))
        } else {
            Arc::new(DocumentTitle::new(default_title))
        };

        Ok(Self {
            config,
            paths,
            source,
            store,
            title,
        })
    }

    pub fn watched(&self) -> WatchedStore {
        WatchedStore::with_key(Arc::clone(&self.store), &self.config.storage.watched_key)
    }

    pub fn session(&self, keys: KeyDispatcher) -> Session {
        Session::new(
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            &self.config.storage.watched_key,
            Arc::clone(&self.title),
            keys,
        )
    }
}
