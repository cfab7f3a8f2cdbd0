use std::fs;
use std::path::Path;

use crate::io::store::StoreError;
use crate::model::Config;

/// Read `config.toml` from the data directory. A missing file (or any
/// missing key) falls back to defaults; a file that exists but does not
/// parse is an error, never silently ignored.
pub fn load_config(data_dir: &Path) -> Result<Config, StoreError> {
    let path = data_dir.join("config.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}
