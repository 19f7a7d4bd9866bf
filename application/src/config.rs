//! [`Config`]-related definitions.

use std::time;

use common::Money;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::{de::Error as _, Deserialize, Deserializer};
use service::command::create_booking;
use smart_default::SmartDefault;

/// Configuration of the whole application.
///
/// Every field is optional and falls back to its default.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: Server,

    /// Business logic settings.
    pub service: Service,

    /// Database connection settings.
    pub postgres: Postgres,

    /// Logging settings.
    pub log: Log,
}

impl Config {
    /// Prefix of the environment variables overriding the file values.
    pub const ENV_PREFIX: &'static str = "CONF";

    /// Loads the [`Config`] from the TOML file at the provided `path`, if it
    /// exists, and overrides it with `CONF.`-prefixed environment variables
    /// (`CONF.SERVER.PORT=80`, for example).
    ///
    /// # Errors
    ///
    /// If any of the values is malformed.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let file = config::File::with_name(path.as_ref()).required(false);
        let env = config::Environment::with_prefix(Self::ENV_PREFIX)
            .separator(".");
        ConfigBuilder::<DefaultState>::default()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Address to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [CORS] settings.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] settings.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API, `*` allowing any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Business logic settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret signing [JWT] session tokens.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// How long an issued session token stays valid, like `24h` or `30m`.
    #[default(time::Duration::from_secs(24 * 60 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Fees added to the accommodation price of a booking.
    pub fees: Fees,

    /// Whether booking prices sent by clients are trusted.
    pub price_policy: PricePolicy,
}

impl From<Service> for service::Config {
    fn from(conf: Service) -> Self {
        let secret = conf.jwt_secret.as_bytes();
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: conf.session_ttl,
            fees: service::domain::pricing::Fees {
                cleaning: conf.fees.cleaning,
                service: conf.fees.service,
            },
            price_policy: match conf.price_policy {
                PricePolicy::TrustClient => {
                    create_booking::PricePolicy::TrustClient
                }
                PricePolicy::Recompute => create_booking::PricePolicy::Recompute,
            },
        }
    }
}

/// Fees added to the accommodation price of a booking.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Fees {
    /// Charged per unit per night.
    #[default(Money::from(40_i64))]
    pub cleaning: Money,

    /// Charged once per booking.
    #[default(Money::from(160_i64))]
    pub service: Money,
}

/// Whether booking prices sent by clients are trusted, as `trust_client` or
/// `recompute`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Client total is stored as is.
    TrustClient,

    /// Client total is ignored in favor of the one computed from the listing
    /// rate and the [`Fees`].
    #[default]
    Recompute,
}

/// Database connection settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Server host.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Server port.
    #[default(5432)]
    pub port: u16,

    /// Role to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the [`Postgres::user`].
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database to use.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(conf: Postgres) -> Self {
        Self {
            host: Some(conf.host),
            port: Some(conf.port),
            user: Some(conf.user),
            password: Some(conf.password),
            dbname: Some(conf.dbname),
            ..Self::default()
        }
    }
}

/// Logging settings.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Log {
    /// Most verbose level to output: `TRACE`, `DEBUG`, `INFO`, `WARN` or
    /// `ERROR`, case-insensitively.
    #[default(tracing::Level::INFO)]
    #[serde(deserialize_with = "log_level")]
    pub level: tracing::Level,
}

/// Deserializes a [`tracing::Level`] from its name.
fn log_level<'de, D>(deserializer: D) -> Result<tracing::Level, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(|_| {
        D::Error::custom(format!("unknown log level `{name}`"))
    })
}

#[cfg(test)]
mod spec {
    use common::Money;

    use super::{create_booking, Config, PricePolicy};

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log.level, tracing::Level::INFO);
        assert_eq!(config.service.fees.cleaning, Money::from(40_i64));
        assert_eq!(config.service.fees.service, Money::from(160_i64));
        assert!(matches!(config.service.price_policy, PricePolicy::Recompute));

        let service = service::Config::from(config.service);
        assert_eq!(service.price_policy, create_booking::PricePolicy::Recompute);
        assert_eq!(service.session_ttl.as_secs(), 24 * 60 * 60);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let parse = |toml: &str| {
            config::Config::builder()
                .add_source(config::File::from_str(
                    toml,
                    config::FileFormat::Toml,
                ))
                .build()
                .and_then(|c| c.try_deserialize::<Config>())
        };

        let config = parse("[log]\nlevel = \"warn\"").unwrap();
        assert_eq!(config.log.level, tracing::Level::WARN);
        assert_eq!(config.server.port, 8080);

        assert!(parse("[log]\nlevel = \"loud\"").is_err());
    }
}
