use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use thiserror::Error;
use url::Url;

use super::sources::{EnvConfig, FileConfig};
use super::{
    AuthConfig, CloudinarySettings, Config, ConfigMetadata, ConfigWarnings,
    CorsConfig, DatabaseConfig, IngestConfig, ServerConfig, TmdbConfig,
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("parsflix.toml"),
        PathBuf::from("config/parsflix.toml"),
    ]
});

/// Development-only fallbacks; their use is surfaced as a warning.
const DEFAULT_PASSWORD_PEPPER: &str = "parsflix-dev-pepper";
const DEFAULT_TOKEN_HMAC_KEY: &str = "parsflix-dev-token-key";

const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 900;
const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env = EnvConfig::gather();
        let (file, config_path) = self.load_file_config(&env)?;

        self.compose(file, env, config_path, env_file_loaded)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let (path, is_explicit) = match explicit {
            Some(path) => (Some(path), true),
            None => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if is_explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file: FileConfig = toml::from_str(&contents).map_err(|err| {
            ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            }
        })?;

        Ok((Some(file), Some(path)))
    }

    fn compose(
        &self,
        file: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "no parsflix.toml detected; using environment variables only",
                "create parsflix.toml or point PARSFLIX_CONFIG at one",
            );
        }

        let file = file.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file.server.port).unwrap_or(3000),
        };

        let database_url = env.database_url.or(file.database.url);
        if let Some(url) = &database_url {
            let parsed = Url::parse(url)
                .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
            if !matches!(parsed.scheme(), "postgres" | "postgresql") {
                return Err(ConfigLoadError::UnsupportedDatabaseScheme {
                    scheme: parsed.scheme().to_string(),
                });
            }
        }
        let database = DatabaseConfig {
            url: database_url,
            max_connections: env
                .database_max_connections
                .or(file.database.max_connections)
                .unwrap_or(10),
        };

        let tmdb = TmdbConfig {
            api_key: env.tmdb_api_key.or(file.tmdb.api_key),
            base_url: env.tmdb_base_url.or(file.tmdb.base_url),
            image_base_url: env
                .tmdb_image_base_url
                .or(file.tmdb.image_base_url),
        };

        let cloudinary = CloudinarySettings {
            url: env.cloudinary_url.or(file.cloudinary.url),
            upload_folder: env
                .cloudinary_upload_folder
                .or(file.cloudinary.upload_folder),
        };

        let password_pepper = env
            .password_pepper
            .or(file.auth.password_pepper)
            .unwrap_or_else(|| {
                warnings.push_with_hint(
                    "PASSWORD_PEPPER not set; using the built-in development pepper",
                    "set PASSWORD_PEPPER before storing real accounts",
                );
                DEFAULT_PASSWORD_PEPPER.to_string()
            });
        let token_hmac_key = env
            .token_hmac_key
            .or(file.auth.token_hmac_key)
            .unwrap_or_else(|| {
                warnings.push_with_hint(
                    "TOKEN_HMAC_KEY not set; using the built-in development key",
                    "set TOKEN_HMAC_KEY before storing real sessions",
                );
                DEFAULT_TOKEN_HMAC_KEY.to_string()
            });

        let auth = AuthConfig {
            jwt_secret: env.jwt_secret.or(file.auth.jwt_secret),
            password_pepper,
            token_hmac_key,
            access_token_ttl_secs: env
                .access_token_ttl_secs
                .or(file.auth.access_token_ttl_secs)
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl_days: env
                .refresh_token_ttl_days
                .or(file.auth.refresh_token_ttl_days)
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
        };

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file.cors.allowed_origins)
                .unwrap_or_default(),
        };
        if cors.allowed_origins.is_empty() {
            warnings.push(
                "CORS_ALLOWED_ORIGINS not set; allowing any origin",
            );
        }

        let ingest = IngestConfig {
            cast_limit: env
                .ingest_cast_limit
                .or(file.ingest.cast_limit)
                .unwrap_or(15),
            include_specials: env
                .ingest_include_specials
                .or(file.ingest.include_specials)
                .unwrap_or(false),
        };

        let config = Config {
            server,
            database,
            tmdb,
            cloudinary,
            auth,
            cors,
            ingest,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        Ok(ConfigLoad { config, warnings })
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}' (expected postgres)")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("missing required configuration: {names}")]
    MissingRequired { names: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
