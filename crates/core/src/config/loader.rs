use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load the Plot Guess configuration from `path`.
///
/// The TOML file is the base layer. `PLOTGUESS_`-prefixed environment
/// variables override it, with `_` separating section and key, so
/// `PLOTGUESS_SERVER_PORT=9000` sets `server.port`. Keys that themselves
/// contain `_` (such as `api_key`) can only be set in the file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("PLOTGUESS_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Parse a TOML document alone, without file or environment layers.
///
/// Used by tests and in-process fixtures that build a config inline.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[search]
backend = "omdb"

[search.omdb]
api_key = "k"

[server]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.search.backend, SearchBackend::Omdb);
    }

    #[test]
    fn test_load_config_from_str_missing_search() {
        let toml = r#"
[server]
port = 8080
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[search]
backend = "tmdb"

[search.tmdb]
api_key = "secret"

[server]
host = "127.0.0.1"
port = 3000

[session]
debounce_ms = 150
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.session.debounce_ms, 150);
        assert_eq!(config.search.tmdb.unwrap().api_key, "secret");
    }
}
