use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Whether two owners may share an e-mail address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerEmailPolicy {
    Strict,
    Lenient,
}

impl std::str::FromStr for OwnerEmailPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("expected 'strict' or 'lenient', got '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub public_base_url: String,
    pub owner_email_policy: OwnerEmailPolicy,
    pub default_owner_email: String,
    pub admin_token: Option<String>,
    pub collaborator_timeout: Duration,
    pub registration_attempts: u32,
    pub sendgrid_api_key: Option<String>,
    pub email_from: String,
    pub geocoder_url: Option<String>,
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/pets.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            public_base_url: "http://localhost:3000".to_string(),
            owner_email_policy: OwnerEmailPolicy::Strict,
            default_owner_email: "registry@localhost".to_string(),
            admin_token: None,
            collaborator_timeout: Duration::from_secs(10),
            registration_attempts: 5,
            sendgrid_api_key: None,
            email_from: "alerts@pettag.local".to_string(),
            geocoder_url: Some("https://nominatim.openstreetmap.org/reverse".to_string()),
            cors_origin: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the environment. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match non_empty("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        let owner_email_policy = match non_empty("OWNER_EMAIL_POLICY") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "OWNER_EMAIL_POLICY",
                reason,
            })?,
            None => defaults.owner_email_policy,
        };

        let collaborator_timeout = match non_empty("COLLABORATOR_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("COLLABORATOR_TIMEOUT_SECS", &raw)?),
            None => defaults.collaborator_timeout,
        };

        let registration_attempts = match non_empty("REGISTRATION_ATTEMPTS") {
            Some(raw) => {
                let n: u32 = parse_number("REGISTRATION_ATTEMPTS", &raw)?;
                if n == 0 {
                    return Err(ConfigError::Invalid {
                        var: "REGISTRATION_ATTEMPTS",
                        reason: "must be at least 1".to_string(),
                    });
                }
                n
            }
            None => defaults.registration_attempts,
        };

        let geocoder_url = match non_empty("GEOCODER_URL") {
            Some(raw) if raw.eq_ignore_ascii_case("off") => None,
            Some(raw) => Some(raw),
            None => defaults.geocoder_url,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr,
            public_base_url: non_empty("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            owner_email_policy,
            default_owner_email: non_empty("DEFAULT_OWNER_EMAIL")
                .unwrap_or(defaults.default_owner_email),
            admin_token: non_empty("ADMIN_TOKEN"),
            collaborator_timeout,
            registration_attempts,
            sendgrid_api_key: non_empty("SENDGRID_API_KEY"),
            email_from: non_empty("NOTIFICATION_EMAIL_FROM").unwrap_or(defaults.email_from),
            geocoder_url,
            cors_origin: non_empty("CORS_ORIGIN"),
        })
    }

    pub fn pet_url(&self, code: &str) -> String {
        format!("{}/pet/{}", self.public_base_url, code)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_email_policy() {
        assert_eq!("strict".parse::<OwnerEmailPolicy>(), Ok(OwnerEmailPolicy::Strict));
        assert_eq!(" Lenient ".parse::<OwnerEmailPolicy>(), Ok(OwnerEmailPolicy::Lenient));
        assert!("sometimes".parse::<OwnerEmailPolicy>().is_err());
    }

    #[test]
    fn pet_url_embeds_code() {
        let config = AppConfig {
            public_base_url: "https://pets.example.org".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.pet_url("PET_AB12CD34"),
            "https://pets.example.org/pet/PET_AB12CD34"
        );
    }

    #[test]
    fn number_errors_name_the_variable() {
        let err = parse_number::<u64>("COLLABORATOR_TIMEOUT_SECS", "ten").unwrap_err();
        assert!(err.to_string().starts_with("COLLABORATOR_TIMEOUT_SECS is invalid"));
    }
}
