use crate::access::BasicCredentials;
use crate::error::{DashboardError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const INDEX_FILE: &str = "index.html";
pub const DATA_FILE: &str = "dashboard_data.json";

/// Runtime settings of the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `index.html` and the static assets.
    pub root: PathBuf,
    /// Snapshot used by the API endpoints.
    pub data: PathBuf,
    pub bind: SocketAddr,
    pub credentials: BasicCredentials,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>, credentials: BasicCredentials) -> Self {
        let root = root.into();
        ServerConfig {
            data: root.join(DATA_FILE),
            root,
            // Constant address, always parses
            bind: DEFAULT_BIND.parse().unwrap(),
            credentials,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
}

/// Command line of the dashboard server. Every flag can come from the environment.
#[derive(Debug, Parser)]
#[command(name = "dashboard-server", about = "Serve the call tracking dashboard behind basic auth")]
pub struct ServerArgs {
    /// Directory containing index.html and the dashboard assets
    #[arg(long, env = "DASHBOARD_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Snapshot file, defaults to <root>/dashboard_data.json
    #[arg(long, env = "DASHBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "DASHBOARD_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    #[arg(long, env = "BASIC_AUTH_USER")]
    pub user: String,

    #[arg(long, env = "BASIC_AUTH_PASS", hide_env_values = true)]
    pub password: String,
}

impl ServerArgs {
    pub fn into_config(self) -> Result<ServerConfig> {
        if self.user.is_empty() || self.password.is_empty() {
            return Err(DashboardError::Config(
                "basic auth username and password cannot be empty".to_string(),
            ));
        }

        let bind = self
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| DashboardError::Config(format!("invalid bind address {}: {}", self.bind, e)))?;

        let mut config = ServerConfig::new(self.root, BasicCredentials::new(self.user, self.password));
        config.bind = bind;
        if let Some(data) = self.data {
            config.data = data;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerArgs {
        let mut argv = vec!["dashboard-server"];
        argv.extend_from_slice(args);
        ServerArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn data_defaults_under_root() {
        let config = parse(&["--root", "/srv/dash", "--user", "u", "--password", "p"])
            .into_config()
            .unwrap();
        assert_eq!(config.data, PathBuf::from("/srv/dash/dashboard_data.json"));
        assert_eq!(config.index_path(), PathBuf::from("/srv/dash/index.html"));
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn bad_bind_is_a_config_error() {
        let err = parse(&["--bind", "nowhere", "--user", "u", "--password", "p"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn empty_password_rejected() {
        let err = parse(&["--user", "u", "--password", ""]).into_config().unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
