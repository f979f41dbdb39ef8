use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tool configuration, persisted as JSON under `~/.prospero/<env>/`.
/// `PROSPERO_ENV` selects the environment; `PROSPERO_SCRIPTS_DIR` overrides
/// where `.pro` scripts are looked up.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub scripts_dir: PathBuf,
    pub env_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let env_name = env::var("PROSPERO_ENV").unwrap_or_else(|_| String::from("default"));

        let scripts_dir = if let Ok(custom_dir) = env::var("PROSPERO_SCRIPTS_DIR") {
            PathBuf::from(custom_dir)
        } else {
            // First check if there's a local scripts directory
            let local_scripts = Path::new("./data/scripts");
            if local_scripts.is_dir() {
                local_scripts.to_path_buf()
            } else {
                Self::base_dir().join(&env_name).join("scripts")
            }
        };

        Config {
            scripts_dir,
            env_name,
            aliases: Vec::new(),
            env_vars: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();
        if !config_path.exists() {
            let config = Config::default();
            config.save().unwrap_or_default();
            return config;
        }

        let contents = fs::read_to_string(&config_path).unwrap_or_default();
        serde_json::from_str(&contents).unwrap_or_default()
    }

    pub fn save(&self) -> io::Result<()> {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)
    }

    fn base_dir() -> PathBuf {
        let home = if cfg!(windows) {
            env::var("USERPROFILE")
        } else {
            env::var("HOME")
        };
        PathBuf::from(home.unwrap_or_else(|_| String::from("."))).join(".prospero")
    }

    pub fn get_config_path() -> PathBuf {
        let env_name = env::var("PROSPERO_ENV").unwrap_or_else(|_| String::from("default"));
        Self::base_dir().join(env_name).join("config.json")
    }

    pub fn get_rc_path() -> PathBuf {
        let env_name = env::var("PROSPERO_ENV").unwrap_or_else(|_| String::from("default"));
        Self::base_dir().join(env_name).join("prosperorc")
    }

    pub fn load_rc_file() -> io::Result<String> {
        let rc_path = Self::get_rc_path();
        if !rc_path.exists() {
            let default_rc = format!(
                "# Prospero RC File\n\n\
                # Environment Variables\n\
                export PROSPERO_SCRIPTS_DIR={}\n\n\
                # Aliases\n\
                alias pro-check='prospero check'\n",
                Self::default().scripts_dir.display()
            );
            if let Some(parent) = rc_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&rc_path, &default_rc)?;
            Ok(default_rc)
        } else {
            fs::read_to_string(&rc_path)
        }
    }

    pub fn parse_rc_file(contents: &str) -> (Vec<String>, HashMap<String, String>) {
        let mut aliases = Vec::new();
        let mut env_vars = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("alias ") {
                aliases.push(line.to_string());
            } else if line.starts_with("export ") {
                if let Some((key, value)) = line["export ".len()..].split_once('=') {
                    env_vars.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }

        (aliases, env_vars)
    }
}
