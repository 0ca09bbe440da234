//! Authenticator selection
//!
//! `OAUTHENTICATOR` names the login provider. Each provider has its own
//! settings struct, and any variable the provider requires must be set
//! before a configuration is produced. An unknown or unset provider falls
//! back to native sign-up authentication.

use crate::env::{self, Environment};
use crate::error::ConfigError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};


/// Variable that selects the provider
pub const PROVIDER_VAR: &str = "OAUTHENTICATOR";

pub const OAUTH_CLIENT_ID: &str = "OAUTH_CLIENT_ID";
pub const OAUTH_CLIENT_SECRET: &str = "OAUTH_CLIENT_SECRET";
pub const OAUTH_CALLBACK_URL: &str = "OAUTH_CALLBACK_URL";
pub const OAUTH_AUTHORIZE_URL: &str = "OAUTH_AUTHORIZE_URL";
pub const OAUTH_TOKEN_URL: &str = "OAUTH_TOKEN_URL";
pub const OAUTH_USERDATA_URL: &str = "OAUTH_USERDATA_URL";

/// Variables required by Authentik, in the order they are checked
pub const AUTHENTIK_REQUIRED: [&str; 6] = [
    OAUTH_CLIENT_ID,
    OAUTH_CLIENT_SECRET,
    OAUTH_CALLBACK_URL,
    OAUTH_AUTHORIZE_URL,
    OAUTH_TOKEN_URL,
    OAUTH_USERDATA_URL,
];

/// Variables required by GitHub, in the order they are checked
pub const GITHUB_REQUIRED: [&str; 3] = [OAUTH_CALLBACK_URL, OAUTH_CLIENT_ID, OAUTH_CLIENT_SECRET];

/// Supported login providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProvider {
    Authentik,
    GitHub,
    GitLab,
    Native,
}

impl AuthProvider {
    /// Values of `OAUTHENTICATOR` that select an OAuth provider
    pub const SUPPORTED: [&'static str; 3] = ["AUTHENTIK", "GITHUB", "GITLAB"];

    /// Match a provider name case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "AUTHENTIK" => Some(AuthProvider::Authentik),
            "GITHUB" => Some(AuthProvider::GitHub),
            "GITLAB" => Some(AuthProvider::GitLab),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AuthProvider::Authentik => "Authentik",
            AuthProvider::GitHub => "GitHub",
            AuthProvider::GitLab => "GitLab",
            AuthProvider::Native => "Native",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// OAuth client registration shared by the OAuth providers
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// Generic OIDC settings used for Authentik
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericOAuthConfig {
    pub client: OAuthClient,
    pub authorize_url: String,
    pub token_url: String,
    pub userdata_url: String,
    pub userdata_method: String,
    pub userdata_params: BTreeMap<String, String>,
    pub username_key: String,
    pub scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubOAuthConfig {
    pub client: OAuthClient,
    pub scope: Vec<String>,
}

/// GitLab reads its client settings from the environment on its own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitLabOAuthConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAuthConfig {
    pub open_signup: bool,
}

impl Default for NativeAuthConfig {
    fn default() -> Self {
        Self { open_signup: true }
    }
}

/// The selected authenticator and its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorConfig {
    Authentik(GenericOAuthConfig),
    GitHub(GitHubOAuthConfig),
    GitLab(GitLabOAuthConfig),
    Native(NativeAuthConfig),
}

impl AuthenticatorConfig {
    pub fn provider(&self) -> AuthProvider {
        match self {
            AuthenticatorConfig::Authentik(_) => AuthProvider::Authentik,
            AuthenticatorConfig::GitHub(_) => AuthProvider::GitHub,
            AuthenticatorConfig::GitLab(_) => AuthProvider::GitLab,
            AuthenticatorConfig::Native(_) => AuthProvider::Native,
        }
    }

    /// Import path of the authenticator class
    pub fn class_name(&self) -> &'static str {
        match self {
            AuthenticatorConfig::Authentik(_) => "oauthenticator.generic.GenericOAuthenticator",
            AuthenticatorConfig::GitHub(_) => "oauthenticator.github.GitHubOAuthenticator",
            AuthenticatorConfig::GitLab(_) => "oauthenticator.gitlab.GitLabOAuthenticator",
            AuthenticatorConfig::Native(_) => "nativeauthenticator.NativeAuthenticator",
        }
    }

    /// Config namespace the provider settings live under
    pub fn namespace(&self) -> &'static str {
        match self {
            AuthenticatorConfig::Authentik(_) => "GenericOAuthenticator",
            AuthenticatorConfig::GitHub(_) => "GitHubOAuthenticator",
            AuthenticatorConfig::GitLab(_) => "GitLabOAuthenticator",
            AuthenticatorConfig::Native(_) => "NativeAuthenticator",
        }
    }

    /// Provider-specific attributes
    pub fn traits(&self) -> BTreeMap<String, Value> {
        let mut traits = BTreeMap::new();
        match self {
            AuthenticatorConfig::Authentik(cfg) => {
                insert_client(&mut traits, &cfg.client);
                traits.insert("authorize_url".into(), json!(cfg.authorize_url));
                traits.insert("token_url".into(), json!(cfg.token_url));
                traits.insert("userdata_url".into(), json!(cfg.userdata_url));
                traits.insert("userdata_method".into(), json!(cfg.userdata_method));
                traits.insert("userdata_params".into(), json!(cfg.userdata_params));
                traits.insert("username_key".into(), json!(cfg.username_key));
                traits.insert("scope".into(), json!(cfg.scope));
            }
            AuthenticatorConfig::GitHub(cfg) => {
                insert_client(&mut traits, &cfg.client);
                traits.insert("scope".into(), json!(cfg.scope));
            }
            AuthenticatorConfig::GitLab(_) => {}
            AuthenticatorConfig::Native(cfg) => {
                traits.insert("open_signup".into(), json!(cfg.open_signup));
            }
        }
        traits
    }
}

fn insert_client(traits: &mut BTreeMap<String, Value>, client: &OAuthClient) {
    traits.insert("client_id".into(), json!(client.client_id));
    traits.insert("client_secret".into(), json!(client.client_secret));
    traits.insert("oauth_callback_url".into(), json!(client.callback_url));
}

/// Choose and configure the authenticator from `OAUTHENTICATOR`
pub fn select_authenticator(env: &dyn Environment) -> Result<AuthenticatorConfig, ConfigError> {
    let provider = match env.var(PROVIDER_VAR) {
        Some(value) => AuthProvider::parse(&value).unwrap_or_else(|| {
            warn!(
                "Supported {} values: {}",
                PROVIDER_VAR,
                AuthProvider::SUPPORTED.join(", ")
            );
            warn!("Falling back to native authentication.");
            AuthProvider::Native
        }),
        None => AuthProvider::Native,
    };

    let config = configure(env, provider)?;
    info!("Using {} authenticator ({})", provider, config.class_name());
    Ok(config)
}

/// Build the settings for a specific provider
pub fn configure(
    env: &dyn Environment,
    provider: AuthProvider,
) -> Result<AuthenticatorConfig, ConfigError> {
    let context = provider.display_name();

    let config = match provider {
        AuthProvider::Authentik => {
            let [client_id, client_secret, callback_url, authorize_url, token_url, userdata_url] =
                require_all(env, AUTHENTIK_REQUIRED, context)?;

            AuthenticatorConfig::Authentik(GenericOAuthConfig {
                client: OAuthClient {
                    client_id,
                    client_secret,
                    callback_url,
                },
                authorize_url,
                token_url,
                userdata_url,
                userdata_method: "GET".to_string(),
                userdata_params: BTreeMap::from([(
                    "scope".to_string(),
                    "openid email profile".to_string(),
                )]),
                username_key: "preferred_username".to_string(),
                scope: to_strings(&["openid", "email", "profile"]),
            })
        }
        AuthProvider::GitHub => {
            let [callback_url, client_id, client_secret] =
                require_all(env, GITHUB_REQUIRED, context)?;

            AuthenticatorConfig::GitHub(GitHubOAuthConfig {
                client: OAuthClient {
                    client_id,
                    client_secret,
                    callback_url,
                },
                scope: to_strings(&["read:org", "read:user", "user:email"]),
            })
        }
        AuthProvider::GitLab => AuthenticatorConfig::GitLab(GitLabOAuthConfig),
        AuthProvider::Native => AuthenticatorConfig::Native(NativeAuthConfig::default()),
    };

    Ok(config)
}

/// Fetch every variable in order, failing on the first one that is missing
fn require_all<const N: usize>(
    env: &dyn Environment,
    vars: [&str; N],
    context: &str,
) -> Result<[String; N], ConfigError> {
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, var) in values.iter_mut().zip(vars) {
        *slot = env::require(env, var, context)?;
    }
    Ok(values)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
