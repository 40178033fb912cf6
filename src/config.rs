use std::fs;

use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend API base URL. Defaults to the local development server.
    pub api_url: Option<String>,
    /// Default record caps for the listing endpoints.
    pub influencer_limit: Option<u32>,
    pub video_limit: Option<u32>,
}

pub fn load_config() -> Config {
    let Some(dirs) = ProjectDirs::from("", "", "eldo") else {
        return Config::default();
    };

    let path = dirs.config_dir().join("config.toml");
    let Ok(data) = fs::read_to_string(&path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_parses() {
        let config: Config = toml::from_str("api_url = \"https://example.test/api/v1\"").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://example.test/api/v1"));
        assert!(config.video_limit.is_none());
    }
}
