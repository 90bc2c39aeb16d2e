#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::Framing;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    ServerUrl,
    WsUrl,
    Framing,
    AuthToken,
    RequestTimeout,
    LogFile,
}

fn default_config_path() -> String {
    #[allow(unused_mut)]
    let mut config_path = dirs::config_dir().map(|dir| return dir.join("chat/config.toml"));

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            config_path = Some(home.join(".config/chat/config.toml"));
        }
    }

    return config_path
        .and_then(|config_path| return config_path.to_str().map(str::to_string))
        .unwrap_or_default();
}

fn find_arg(cmd: &Command, key: ConfigKey) -> Option<&clap::Arg> {
    let name = key.to_string();
    return cmd
        .get_arguments()
        .find(|arg| return arg.get_long() == Some(name.as_str()));
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let res = match key {
            ConfigKey::ServerUrl => "http://127.0.0.1:8000",
            ConfigKey::WsUrl => "ws://127.0.0.1:8000",
            ConfigKey::RequestTimeout => "30000",
            ConfigKey::AuthToken => "",
            ConfigKey::LogFile => "",

            // Special
            ConfigKey::ConfigFile => return default_config_path(),
            ConfigKey::Framing => return Framing::default().to_string(),
        };

        return res.to_string();
    }

    pub fn framing() -> Result<Framing> {
        let val = Config::get(ConfigKey::Framing);
        if let Some(framing) = Framing::parse(&val) {
            return Ok(framing);
        }

        bail!(format!("Invalid value for '{}': {val}", ConfigKey::Framing))
    }

    pub fn request_timeout() -> Result<Duration> {
        let val = Config::get(ConfigKey::RequestTimeout);
        match val.parse::<u64>() {
            Ok(millis) => return Ok(Duration::from_millis(millis)),
            Err(_) => bail!(format!(
                "Invalid value for '{}': {val} is not a number of milliseconds",
                ConfigKey::RequestTimeout
            )),
        }
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }
        Config::set(ConfigKey::ConfigFile, &config_file);

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile {
                    continue;
                }

                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = find_arg(&cmd, key) {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}': expected a string or an integer"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            config_file = Config::get(ConfigKey::ConfigFile),
            server_url = Config::get(ConfigKey::ServerUrl),
            ws_url = Config::get(ConfigKey::WsUrl),
            framing = Config::get(ConfigKey::Framing),
            request_timeout = Config::get(ConfigKey::RequestTimeout),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = find_arg(&cmd, key)?;
                let mut description = arg
                    .get_help()?
                    .to_string()
                    .split("[default:")
                    .next()?
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
