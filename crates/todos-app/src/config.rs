//! Client configuration loaded from TOML and the environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use todos_core::id::OwnerId;
use todos_store_http::HttpStore;
use tracing::warn;

use crate::sync::{BulkTogglePolicy, DEFAULT_ERROR_DWELL_MS, SyncOptions};

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_BASE_URL: &str = "TODOS_BASE_URL";
/// Environment variable overriding [`ClientConfig::owner_id`].
pub const ENV_OWNER_ID: &str = "TODOS_OWNER_ID";
/// Server used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

const CONFIG_DIR: &str = "todos";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    client: ClientConfig,
}

/// Connection and behavior settings from the `[client]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Server hosting the `/todos` collection.
    pub base_url: String,
    /// Owner scoping every request; `None` or `0` keeps the client from starting.
    pub owner_id: Option<u64>,
    /// Per-request timeout. Requests never time out when unset.
    pub request_timeout_ms: Option<u64>,
    /// How long error banners stay visible.
    pub error_dwell_ms: u64,
    /// Reconciliation policy for toggle-all.
    pub toggle_all_policy: BulkTogglePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            owner_id: None,
            request_timeout_ms: None,
            error_dwell_ms: DEFAULT_ERROR_DWELL_MS,
            toggle_all_policy: BulkTogglePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Per-user configuration file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from `explicit` or the default location, then apply
    /// environment overrides.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed, or when the
    /// resulting configuration is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut fetch = |key: &'static str| env::var(key).ok();
        Self::load_with_env(explicit, &mut fetch)
    }

    fn load_with_env(
        explicit: Option<&Path>,
        fetch: &mut impl FnMut(&'static str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                Self::from_path(path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_path(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_with(fetch);
        config.validate()?;
        Ok(config)
    }

    /// Parse the `[client]` table of a configuration file. Other tables are ignored.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse the `[client]` table of a TOML document.
    ///
    /// # Errors
    /// Returns an error when the document is not valid TOML or has unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.client)
    }

    fn apply_env_with(&mut self, fetch: &mut impl FnMut(&'static str) -> Option<String>) {
        if let Some(base_url) = non_blank(fetch(ENV_BASE_URL)) {
            self.base_url = base_url;
        }
        if let Some(raw) = non_blank(fetch(ENV_OWNER_ID)) {
            match raw.parse::<OwnerId>() {
                Ok(owner) => self.owner_id = Some(owner.get()),
                Err(err) => {
                    warn!(value = %raw, error = %err, "Ignoring invalid {ENV_OWNER_ID}");
                    self.owner_id = None;
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("client.base_url must not be empty");
        }
        if self.error_dwell_ms == 0 {
            bail!("client.error_dwell_ms must be greater than zero");
        }
        if self.request_timeout_ms == Some(0) {
            bail!("client.request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    /// Owner scoping every request. `None` when missing or zero.
    #[must_use]
    pub fn owner(&self) -> Option<OwnerId> {
        self.owner_id.and_then(OwnerId::new)
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Options for the synchronization core.
    #[must_use]
    pub const fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            toggle_all: self.toggle_all_policy,
            error_dwell: Duration::from_millis(self.error_dwell_ms),
        }
    }

    /// Build the HTTP store these settings describe.
    ///
    /// # Errors
    /// Returns an error when the base URL is not an http(s) URL.
    pub fn store(&self) -> Result<HttpStore> {
        HttpStore::with_timeout(&self.base_url, self.request_timeout())
            .with_context(|| format!("invalid client.base_url '{}'", self.base_url))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
