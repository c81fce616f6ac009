mod unified_config;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub use unified_config::*;

/// File stem looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_STEM: &str = "gallery-migrate";

/// Environment variable prefix, e.g. `MIGRATE__GALLERY__BASE_URL`
pub const ENV_PREFIX: &str = "MIGRATE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration error: {field} {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Load configuration from an optional file layered with `MIGRATE__*`
/// environment variables. A `.env` file in the working directory is read first.
///
/// When `path` is `None`, `gallery-migrate.{toml,yaml,json}` is used if present.
/// Only service-independent settings are validated here.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenv::dotenv().ok();

    let file_source = match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            config::File::from(path).required(true)
        }
        None => config::File::with_name(DEFAULT_CONFIG_STEM).required(false),
    };

    let config: AppConfig = config::Config::builder()
        .add_source(file_source)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate_settings()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_from_toml_file() {
        let file = write_config(
            r#"
            [gallery]
            base_url = "http://photos.example.com/gallery2/main.php"
            username = "admin"
            password = "secret"
            local = true

            [koken]
            base_url = "http://photos.example.com/koken"
            email = "admin@example.com"

            [migration]
            photo_concurrency = 4
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.gallery.username.as_deref(), Some("admin"));
        assert_eq!(config.gallery.password.as_deref(), Some("secret"));
        assert!(config.gallery.local);
        assert!(!config.koken.local);
        assert_eq!(config.koken.password, None);
        assert_eq!(config.migration.photo_concurrency, 4);
        assert_eq!(config.migration.root_album_caption, "Gallery");
        assert_eq!(config.transport.request_timeout_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gallery_only_config_loads() {
        let file = write_config(
            r#"
            [gallery]
            base_url = "http://photos.example.com/gallery2/main.php"
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert!(config.validate_gallery().is_ok());
        assert!(matches!(
            config.validate_koken(),
            Err(ConfigError::Invalid {
                field: "koken.base_url",
                ..
            })
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "koken.base_url",
                ..
            })
        ));
    }

    #[test]
    fn test_load_config_rejects_zero_timeout() {
        let file = write_config(
            r#"
            [transport]
            request_timeout_secs = 0
            "#,
        );

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "transport.request_timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency_and_bad_scheme() {
        let mut config = AppConfig::default();
        config.gallery.base_url = "http://a.example/main.php".to_string();
        config.koken.base_url = "ftp://b.example/koken".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "koken.base_url",
                ..
            })
        ));

        config.koken.base_url = "https://b.example/koken".to_string();
        config.migration.photo_concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "migration.photo_concurrency",
                ..
            })
        ));

        config.migration.photo_concurrency = 2;
        assert!(config.validate().is_ok());
    }
}
