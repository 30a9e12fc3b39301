use anyhow::{Context, Result};

pub const DEV_SECRET: &str = "dev-secret-change-me";

/// Named option bundle selected by `NOTEJAM_ENV`. Unknown or missing values
/// run the development profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Production,
    Development,
    Testing,
}

impl Profile {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") => Profile::Production,
            Some("testing") => Profile::Testing,
            _ => Profile::Development,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("NOTEJAM_ENV").ok().as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub secret_key: String,
    pub debug: bool,
    pub testing: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let profile = Profile::from_env();

        let host = std::env::var("NOTEJAM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("NOTEJAM_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("NOTEJAM_PORT must be a port number")?;
        let db_path = std::env::var("NOTEJAM_DB_PATH").unwrap_or_else(|_| "notejam.db".into());
        let secret_key = std::env::var("NOTEJAM_SECRET_KEY").unwrap_or_else(|_| DEV_SECRET.into());

        Ok(Self {
            profile,
            host,
            port,
            db_path,
            secret_key,
            debug: profile == Profile::Development,
            testing: profile == Profile::Testing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parse() {
        assert_eq!(Profile::parse(Some("production")), Profile::Production);
        assert_eq!(Profile::parse(Some("testing")), Profile::Testing);
        assert_eq!(Profile::parse(Some("development")), Profile::Development);
        assert_eq!(Profile::parse(Some("something-else")), Profile::Development);
        assert_eq!(Profile::parse(None), Profile::Development);
    }
}
