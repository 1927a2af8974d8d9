use std::path::PathBuf;

use crate::error::DashboardError;

pub const DEFAULT_DATA_PATH: &str = "crime_data.csv";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;

/// What preparation does with a measure column that has no display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedCategories {
    /// Keep the raw column name as the label and log it.
    #[default]
    Passthrough,
    /// Fail preparation with a schema error.
    Reject,
}

impl UnmappedCategories {
    fn parse(value: &str) -> Result<Self, DashboardError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "reject" => Ok(Self::Reject),
            other => Err(DashboardError::Config(format!(
                "CRIME_UNMAPPED_CATEGORIES must be 'passthrough' or 'reject', got '{other}'"
            ))),
        }
    }
}

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub access_token: String,
    pub host: String,
    pub port: u16,
    pub unmapped: UnmappedCategories,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            access_token: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            unmapped: UnmappedCategories::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                DashboardError::Config(format!("PORT must be a port number, got '{raw}'"))
            })?,
            None => defaults.port,
        };

        let unmapped = match get("CRIME_UNMAPPED_CATEGORIES") {
            Some(raw) => UnmappedCategories::parse(&raw)?,
            None => defaults.unmapped,
        };

        Ok(Self {
            data_path: get("CRIME_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            access_token: get("MAPBOX_ACCESS_TOKEN").unwrap_or(defaults.access_token),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            unmapped,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
