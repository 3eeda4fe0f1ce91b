use super::{
    types::{Config, SearchBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - The selected search backend has its section and an API key
/// - Session timings and limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    match config.search.backend {
        SearchBackend::Omdb => match &config.search.omdb {
            Some(omdb) if !omdb.api_key.is_empty() => {}
            Some(_) => {
                return Err(ConfigError::ValidationError(
                    "search.omdb.api_key cannot be empty".to_string(),
                ))
            }
            None => {
                return Err(ConfigError::ValidationError(
                    "search.backend = \"omdb\" requires a [search.omdb] section".to_string(),
                ))
            }
        },
        SearchBackend::Tmdb => match &config.search.tmdb {
            Some(tmdb) if !tmdb.api_key.is_empty() => {}
            Some(_) => {
                return Err(ConfigError::ValidationError(
                    "search.tmdb.api_key cannot be empty".to_string(),
                ))
            }
            None => {
                return Err(ConfigError::ValidationError(
                    "search.backend = \"tmdb\" requires a [search.tmdb] section".to_string(),
                ))
            }
        },
    }

    if config.evaluation.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "evaluation.url cannot be empty".to_string(),
        ));
    }

    if config.session.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "session.debounce_ms cannot be 0".to_string(),
        ));
    }

    // The literal-use entry is appended below two distinct titles, so a
    // cap of one would hide provider matches behind it.
    if config.session.max_suggestions < 2 {
        return Err(ConfigError::ValidationError(
            "session.max_suggestions must be at least 2".to_string(),
        ));
    }

    if config.session.max_guess_chars == 0 {
        return Err(ConfigError::ValidationError(
            "session.max_guess_chars cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchConfig, ServerConfig};
    use crate::evaluation::EvaluationConfig;
    use crate::search::{OmdbConfig, TmdbConfig};
    use crate::session::SessionConfig;
    use std::net::IpAddr;

    fn omdb_config() -> Config {
        Config {
            server: ServerConfig::default(),
            search: SearchConfig {
                backend: SearchBackend::Omdb,
                omdb: Some(OmdbConfig {
                    api_key: "key".to_string(),
                    base_url: None,
                }),
                tmdb: None,
                timeout_secs: 10,
            },
            evaluation: EvaluationConfig::default(),
            feedback: None,
            session: SessionConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&omdb_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = omdb_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_missing_backend_section_fails() {
        let mut config = omdb_config();
        config.search.backend = SearchBackend::Tmdb;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("[search.tmdb]"));
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let mut config = omdb_config();
        config.search.backend = SearchBackend::Tmdb;
        config.search.tmdb = Some(TmdbConfig {
            api_key: String::new(),
            base_url: None,
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_debounce_fails() {
        let mut config = omdb_config();
        config.session.debounce_ms = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn test_validate_single_suggestion_fails() {
        let mut config = omdb_config();
        config.session.max_suggestions = 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_suggestions"));
    }
}
