//! Portal credentials and the team roster.

use std::fmt;

use crate::config::{profiled_env_opt, split_list};
use crate::error::ConfigError;
use crate::site::Site;

/// Entry URL and login pair for one portal.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("id", &self.id)
            .field("password", &"***")
            .finish()
    }
}

/// Where crawlers read credentials and members from, once per cycle or
/// session bootstrap. Nothing here is cached by the crawlers.
pub trait CredentialSource: Send + Sync {
    fn load(&self, site: Site) -> Result<Credentials, ConfigError>;

    /// Ordered team-member display names.
    fn team_members(&self) -> Vec<String>;
}

/// Reads `{SITE}_URL`, `{SITE}_USER_ID`, `{SITE}_PASSWORD` and `TEAM_MEMBERS`
/// (profiled like the rest of [`crate::Config`]) on every call.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    profile: String,
}

impl EnvCredentials {
    pub fn new(profile: &str) -> Self {
        Self { profile: profile.to_uppercase() }
    }

    fn require(&self, site: Site, suffix: &str) -> Result<String, ConfigError> {
        let key = format!("{}_{}", site.env_prefix(), suffix);
        profiled_env_opt(&self.profile, &key)
            .ok_or(ConfigError::MissingCredential { site, key })
    }
}

impl CredentialSource for EnvCredentials {
    fn load(&self, site: Site) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            url: self.require(site, "URL")?,
            id: self.require(site, "USER_ID")?,
            password: self.require(site, "PASSWORD")?,
        })
    }

    fn team_members(&self) -> Vec<String> {
        profiled_env_opt(&self.profile, "TEAM_MEMBERS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default()
    }
}

/// Fixed credentials, for one-off runs and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub credentials: Credentials,
    pub members: Vec<String>,
}

impl CredentialSource for StaticCredentials {
    fn load(&self, _site: Site) -> Result<Credentials, ConfigError> {
        Ok(self.credentials.clone())
    }

    fn team_members(&self) -> Vec<String> {
        self.members.clone()
    }
}
