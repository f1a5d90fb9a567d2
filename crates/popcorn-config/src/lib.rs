pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{default_omdb_base_url, Config, OmdbConfig, StorageConfig, UiConfig, DEMO_API_KEY};
pub use credentials::CredentialStore;
pub use paths::{container_base_path, PathManager};
