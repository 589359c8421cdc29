use std::path::Path;

use crate::error::{Error, Result};

use super::types::Config;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = ".shelfload.yml";

/// Load config from an explicit file, failing if it is missing.
pub fn load_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    parse(&contents)
}

/// Load config from `.shelfload.yml` in `dir`, or defaults if absent.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_file(&path)
}

fn parse(contents: &str) -> Result<Config> {
    // An empty file is valid and means "all defaults".
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(contents)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<()> {
    if cfg.engine.trim().is_empty() {
        return Err(Error::Config("engine must not be empty".into()));
    }
    if cfg.collection.is_empty() {
        return Err(Error::Config("collection must not be empty".into()));
    }
    if cfg.text_column.is_empty() {
        return Err(Error::Config("text_column must not be empty".into()));
    }
    if cfg.embed_batch_size == 0 {
        return Err(Error::Config("embed_batch_size must be positive".into()));
    }
    if cfg.upload_batch_size == 0 {
        return Err(Error::Config("upload_batch_size must be positive".into()));
    }
    Ok(())
}
