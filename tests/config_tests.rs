//! Configuration loading and startup validation tests

use std::fs;

use medauth::api::{cors_layer, AppState};
use medauth::auth::{Requirement, RouteAuthorizationPolicy};
use medauth::config::{load_config_from_path, save_config, AccountConfig, Config, CorsConfig, RouteRule};
use medauth::error::Error;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.api_prefix, "/api/v1");
    assert_eq!(config.auth.token_ttl_secs, 86_400);
    assert_eq!(config.cors.allowed_origins, vec!["http://localhost:4000"]);
    assert_eq!(
        config.routes.rules,
        vec![RouteRule {
            pattern: "{prefix}/testing/**".to_string(),
            requirement: Requirement::Authenticated,
        }]
    );
    assert_eq!(config.route_rules()[0].pattern, "/api/v1/testing/**");
}

#[test]
fn test_default_rule_follows_api_prefix() {
    let mut config = Config::default();
    config.server.api_prefix = "/api/v2/".to_string();

    let policy = RouteAuthorizationPolicy::from_rules(&config.route_rules()).unwrap();
    assert_eq!(policy.requirement_for("/api/v2/testing/me"), Requirement::Authenticated);
    assert_eq!(policy.requirement_for("/api/v1/testing/me"), Requirement::Public);
}

#[test]
fn test_state_rejects_rules_leaving_protected_routes_public() {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.server.api_prefix = "/api/v2".to_string();
    config.routes.rules = vec![RouteRule {
        pattern: "/api/v1/testing/**".to_string(),
        requirement: Requirement::Authenticated,
    }];
    assert!(matches!(AppState::from_config(config), Err(Error::Config(_))));
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("medauth.toml");
    fs::write(
        &path,
        r#"
[server]
port = 9000

[auth]
jwt_secret = "${MEDAUTH_TEST_UNSET_SECRET:-from-default}"
token_ttl_secs = 120

[[routes.rules]]
pattern = "/api/v1/public/**"
requirement = "public"

[[routes.rules]]
pattern = "/api/v1/**"
requirement = "authenticated"

[[accounts]]
email = "doc@clinic.test"
password_hash = "$2b$04$abcdefghijklmnopqrstuu"
roles = ["DOCTOR", "ADMIN"]
"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).expect("config should load");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.auth.jwt_secret, "from-default");
    assert_eq!(config.auth.token_ttl_secs, 120);
    assert_eq!(config.accounts.len(), 1);

    let policy = RouteAuthorizationPolicy::from_rules(&config.routes.rules).unwrap();
    assert_eq!(policy.requirement_for("/api/v1/public/login"), Requirement::Public);
    assert_eq!(policy.requirement_for("/api/v1/doctors"), Requirement::Authenticated);
    assert_eq!(policy.requirement_for("/metrics"), Requirement::Public);

    let principal = config.accounts[0].to_principal().unwrap();
    assert_eq!(principal.roles.len(), 2);
    assert!(!principal.id.is_empty());
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("medauth.toml");

    let mut config = Config::default();
    config.server.port = 9100;
    save_config(&config, &path).unwrap();

    let reloaded = load_config_from_path(&path).unwrap();
    assert_eq!(reloaded.server.port, 9100);
    assert_eq!(reloaded.routes.rules, config.routes.rules);
}

#[test]
fn test_missing_file_is_config_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound)));
}

#[test]
fn test_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("medauth.toml");
    fs::write(&path, "this is [ not valid toml").unwrap();

    assert!(matches!(load_config_from_path(&path), Err(Error::TomlParse(_))));
}

#[test]
fn test_unknown_requirement_rejected() {
    let result: Result<Config, _> = toml::from_str(
        r#"
[[routes.rules]]
pattern = "/x"
requirement = "admins_only"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_state_rejects_empty_secret() {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.auth.jwt_secret = String::new();
    assert!(matches!(AppState::from_config(config), Err(Error::Config(_))));
}

#[test]
fn test_state_rejects_zero_ttl() {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.auth.token_ttl_secs = 0;
    assert!(matches!(AppState::from_config(config), Err(Error::Config(_))));
}

#[test]
fn test_state_rejects_ambiguous_routes() {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.routes.rules.push(RouteRule {
        pattern: "/api/v1/testing/**".to_string(),
        requirement: Requirement::Public,
    });
    assert!(matches!(AppState::from_config(config), Err(Error::Config(_))));
}

#[test]
fn test_state_rejects_account_without_roles() {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.accounts.push(AccountConfig {
        id: None,
        email: "nobody@clinic.test".to_string(),
        password_hash: "unused".to_string(),
        roles: vec![],
    });
    assert!(matches!(AppState::from_config(config), Err(Error::InvalidPrincipal(_))));
}

#[test]
fn test_state_rejects_duplicate_accounts() {
    let account = AccountConfig {
        id: None,
        email: "twice@clinic.test".to_string(),
        password_hash: "unused".to_string(),
        roles: vec![medauth::auth::Role::Patient],
    };
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.accounts = vec![account.clone(), account];
    assert!(matches!(AppState::from_config(config), Err(Error::Auth(_))));
}

#[test]
fn test_invalid_cors_origin() {
    let config = CorsConfig {
        allowed_origins: vec!["http://ok.example".to_string(), "bad\norigin".to_string()],
    };
    assert!(matches!(cors_layer(&config), Err(Error::Config(_))));
}
