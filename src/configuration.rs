use crate::auth::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;
use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// `dev` enables destructive admin endpoints.
    #[serde(default)]
    pub platform: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC key for access tokens
    pub token_secret: String,
    /// Static key expected from the payment webhook
    pub polka_key: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64, // seconds
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

impl AuthSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.token_secret".to_string()));
        }
        if self.polka_key.is_empty() {
            return Err(ConfigError::MissingRequired("auth.polka_key".to_string()));
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.access_token_expiry must be positive".to_string(),
            ));
        }
        if !(4..=31).contains(&self.password_cost) {
            return Err(ConfigError::InvalidValue(
                "auth.password_cost must be between 4 and 31".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_access_token_expiry() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS
}

fn default_password_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// Load settings from `configuration.yaml` (optional), then `APP__*`
/// environment variables, e.g. `APP__AUTH__TOKEN_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize::<Settings>()?;

    settings.auth.validate()?;
    Ok(settings)
}
