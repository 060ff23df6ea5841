use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, DepgraphConfig};

pub const CONFIG_FILE_NAME: &str = "depgraph.toml";
pub const CONFIG_ENV: &str = "DEPGRAPH_CONFIG";

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: DepgraphConfig,
    /// File the configuration came from; `None` when defaults are used.
    pub path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Directory relative paths inside the configuration are resolved against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

pub fn resolve_config_with_override(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = config_path {
        return load_resolved(path);
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        return load_resolved(PathBuf::from(path));
    }

    match find_config_from(start.as_ref()) {
        Some(path) => load_resolved(path),
        None => Ok(ResolvedConfig {
            config: DepgraphConfig::default(),
            path: None,
        }),
    }
}

pub fn load_config(path: &Path) -> Result<DepgraphConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn load_resolved(path: PathBuf) -> Result<ResolvedConfig, ConfigError> {
    let config = load_config(&path)?;
    Ok(ResolvedConfig {
        config,
        path: Some(path),
    })
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
