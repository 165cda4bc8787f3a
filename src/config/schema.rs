//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::auth::{Principal, Requirement, Role};
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Accounts seeded into the in-memory credential store
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountConfig>,
}

impl Config {
    /// API prefix without a trailing slash
    pub fn api_prefix(&self) -> &str {
        self.server.api_prefix.trim_end_matches('/')
    }

    /// Route rules with `{prefix}` expanded
    pub fn route_rules(&self) -> Vec<RouteRule> {
        self.routes
            .rules
            .iter()
            .map(|rule| RouteRule {
                pattern: rule.pattern.replace(PREFIX_PLACEHOLDER, self.api_prefix()),
                requirement: rule.requirement,
            })
            .collect()
    }
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for the versioned API routes
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

pub const DEFAULT_JWT_SECRET: &str = "medauth-secret-key-change-in-production";

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    86_400
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Ordered route requirement table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_route_rules")]
    pub rules: Vec<RouteRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteRule {
    /// Path pattern; a leading `{prefix}` stands for `server.api_prefix`
    pub pattern: String,
    pub requirement: Requirement,
}

pub const PREFIX_PLACEHOLDER: &str = "{prefix}";

fn default_route_rules() -> Vec<RouteRule> {
    vec![RouteRule {
        pattern: format!("{}/testing/**", PREFIX_PLACEHOLDER),
        requirement: Requirement::Authenticated,
    }]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            rules: default_route_rules(),
        }
    }
}

/// Allowed browser origins; methods and headers are fixed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:4000".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// A pre-provisioned account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Generated when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub email: String,

    /// bcrypt hash, see `medauth hash-password`
    pub password_hash: String,

    pub roles: Vec<Role>,
}

impl AccountConfig {
    pub fn to_principal(&self) -> Result<Principal> {
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Principal::new(id, &self.email, &self.password_hash, self.roles.iter().copied())
    }
}
