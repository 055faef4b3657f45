//! Policy for managed servers.
//!
//! A managed server id pins its transport, URL and credential header; callers
//! cannot override them. [`ensure_managed_config`] rewrites a config to satisfy
//! the policy, and [`validate_managed_config`] re-checks any config carrying a
//! managed id. `McpClient::new` runs the validation, so a hand-built config
//! cannot skip the policy.

use crate::error::ConfigError;
use crate::mcp::config::{ServerConfig, TransportKind};

/// Fixed requirements for one managed server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedServer {
    pub id: &'static str,
    pub display_name: &'static str,
    pub url: &'static str,
    pub header: &'static str,
    pub secret_var: &'static str,
}

pub const GOOGLE_MAPS_GROUNDING: ManagedServer = ManagedServer {
    id: "google-maps-grounding",
    display_name: "Google Maps Grounding Lite",
    url: "https://mapstools.googleapis.com/mcp",
    header: "X-Goog-Api-Key",
    secret_var: "GOOGLE_MAPS_GROUNDING_API_KEY",
};

const MANAGED_SERVERS: &[ManagedServer] = &[GOOGLE_MAPS_GROUNDING];

/// Look up the policy for a server id.
pub fn managed_server(id: &str) -> Option<&'static ManagedServer> {
    MANAGED_SERVERS.iter().find(|m| m.id == id)
}

pub fn is_managed(id: &str) -> bool {
    managed_server(id).is_some()
}

/// Apply the managed policy for `config.id`, reading the secret from the
/// process environment. Configs with an unmanaged id are returned unchanged.
pub fn ensure_managed_config(config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    match managed_server(&config.id) {
        Some(policy) => {
            let secret = std::env::var(policy.secret_var).ok();
            apply_policy(config, policy, secret)
        }
        None => Ok(config),
    }
}

/// Force `config` onto the Google Maps Grounding policy regardless of its id.
pub fn ensure_managed_google_config(config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    let secret = std::env::var(GOOGLE_MAPS_GROUNDING.secret_var).ok();
    apply_policy(config, &GOOGLE_MAPS_GROUNDING, secret)
}

/// Rewrite `config` to the policy using the given secret value.
pub fn apply_policy(
    mut config: ServerConfig,
    policy: &ManagedServer,
    secret: Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let secret = secret
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingSecret {
            var: policy.secret_var.to_string(),
        })?;

    config.transport = TransportKind::Http;
    config.url = Some(policy.url.to_string());
    // Header names are case-insensitive on the wire; drop every spelling.
    config
        .headers
        .retain(|name, _| !name.eq_ignore_ascii_case(policy.header));
    config.headers.insert(policy.header.to_string(), secret);

    tracing::debug!(
        name: "mcp.managed.enforced",
        server_id = %config.id,
        url = policy.url,
        "Managed server policy applied"
    );

    Ok(config)
}

/// Check a config against the policy of its id, if it has one.
pub fn validate_managed_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let Some(policy) = managed_server(&config.id) else {
        return Ok(());
    };

    if config.transport != TransportKind::Http {
        return Err(ConfigError::WrongTransport {
            server: policy.display_name.to_string(),
        });
    }
    if config.url.as_deref() != Some(policy.url) {
        return Err(ConfigError::WrongUrl {
            server: policy.display_name.to_string(),
            expected: policy.url.to_string(),
        });
    }
    let credentials: Vec<(&String, &String)> = config
        .headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(policy.header))
        .collect();
    match credentials.as_slice() {
        [(name, value)] if name.as_str() == policy.header && !value.is_empty() => {}
        [] | [_] => {
            return Err(ConfigError::MissingHeader {
                server: policy.display_name.to_string(),
                header: policy.header.to_string(),
            });
        }
        _ => {
            return Err(ConfigError::DuplicateHeader {
                server: policy.display_name.to_string(),
                header: policy.header.to_string(),
            });
        }
    }

    Ok(())
}
