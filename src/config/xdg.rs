use std::{env, fs::create_dir_all, path::PathBuf};

use super::ConfigError;

const APP_DIR: &str = "dnp-publish";

/// Grab config path, `$XDG_CONFIG_HOME/dnp-publish` or `$HOME/.config/dnp-publish`
pub fn xdg_config_home() -> Result<PathBuf, ConfigError> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env::var("HOME").map_err(|_| ConfigError::NoHome)?).join(".config"),
    };
    let path = base.join(APP_DIR);
    // If the directory doesnt exist yet, make it!
    if !path.exists() {
        create_dir_all(&path).map_err(|err| ConfigError::io(&path, err))?;
    }
    Ok(path)
}

/// Location of the global config file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(xdg_config_home()?.join("config.json"))
}
