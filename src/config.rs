use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use clap::{parser::ValueSource, value_parser, Arg, ArgMatches, Command};

use crate::util::region::DEFAULT_REGION;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SECRET_KEY: &str = "dev-secret";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("access key id and secret access key must be set together")]
    PartialCredentials,
    #[error("secret key must not be empty")]
    EmptySecretKey,
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub secret_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
}

pub fn command() -> Command {
    Command::new("objectdesk")
        .about("Web front-end for browsing and managing S3 buckets")
        .arg(
            Arg::new("access_key_id")
                .long("access-key-id")
                .env("AWS_ACCESS_KEY_ID")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("secret_access_key")
                .long("secret-access-key")
                .env("AWS_SECRET_ACCESS_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .env("AWS_REGION")
                .default_value(DEFAULT_REGION),
        )
        .arg(
            Arg::new("endpoint_url")
                .long("endpoint-url")
                .env("AWS_ENDPOINT_URL"),
        )
        .arg(
            Arg::new("secret_key")
                .long("secret-key")
                .env("SECRET_KEY")
                .hide_env_values(true)
                .default_value(DEFAULT_SECRET_KEY),
        )
        .arg(
            Arg::new("legacy_secret_key")
                .long("flask-secret-key")
                .env("FLASK_SECRET_KEY")
                .hide(true)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .env("HOST")
                .value_parser(value_parser!(IpAddr))
                .default_value("0.0.0.0"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .env("PORT")
                .value_parser(value_parser!(u16))
                .default_value("5000"),
        )
        .arg(
            Arg::new("max_upload_bytes")
                .long("max-upload-bytes")
                .env("MAX_UPLOAD_BYTES")
                .value_parser(value_parser!(usize))
                .default_value("104857600"),
        )
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_matches(&command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let config = Self {
            access_key_id: matches.get_one::<String>("access_key_id").cloned(),
            secret_access_key: matches.get_one::<String>("secret_access_key").cloned(),
            region: matches
                .get_one::<String>("region")
                .cloned()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: matches.get_one::<String>("endpoint_url").cloned(),
            secret_key: secret_key(matches),
            host: matches
                .get_one::<IpAddr>("host")
                .copied()
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: matches
                .get_one::<u16>("port")
                .copied()
                .unwrap_or(DEFAULT_PORT),
            max_upload_bytes: matches
                .get_one::<usize>("max_upload_bytes")
                .copied()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ConfigError::PartialCredentials);
        }
        if self.secret_key.is_empty() {
            return Err(ConfigError::EmptySecretKey);
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_default_secret_key(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// `SECRET_KEY` wins; `FLASK_SECRET_KEY` is honored when only the default
/// would apply.
fn secret_key(matches: &ArgMatches) -> String {
    let explicit = matches
        .value_source("secret_key")
        .is_some_and(|source| source != ValueSource::DefaultValue);

    let legacy = matches.get_one::<String>("legacy_secret_key");
    match (explicit, legacy) {
        (false, Some(legacy)) => legacy.clone(),
        _ => matches
            .get_one::<String>("secret_key")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
