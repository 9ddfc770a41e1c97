use crate::client::{AUTH_API, TASK_API};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings persisted between invocations
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// NAS base URL, e.g. `https://nas.local:5001`
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub user: String,
    /// Default destination folder
    #[serde(default)]
    pub download_dir: String,
    /// Alternative destination folder
    #[serde(default)]
    pub conversion_dir: String,
    /// Discovered API layout, written by the settings flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_paths: Option<ApiPaths>,
    /// Re-enables TLS certificate validation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub verify_certificates: bool,
}

impl Config {
    /// Returns the API map if it holds everything magnet submission needs
    #[must_use]
    pub fn usable_api_paths(&self) -> Option<&ApiPaths> {
        self.api_paths.as_ref().filter(|paths| paths.has_required())
    }
}

/// Mapping from API name to its request path relative to `/webapi/`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiPaths(BTreeMap<String, String>);

impl ApiPaths {
    #[must_use]
    pub fn get(&self, api: &str) -> Option<&str> {
        self.0.get(api).map(String::as_str)
    }

    pub fn insert(&mut self, api: impl Into<String>, path: impl Into<String>) {
        self.0.insert(api.into(), path.into());
    }

    /// Whether both the auth and the task API are known
    #[must_use]
    pub fn has_required(&self) -> bool {
        self.0.contains_key(AUTH_API) && self.0.contains_key(TASK_API)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ApiPaths {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(api, path)| (api.into(), path.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_required() {
        let mut paths: ApiPaths = [(AUTH_API, "auth.cgi")].into_iter().collect();
        assert!(!paths.has_required());
        paths.insert(TASK_API, "DownloadStation/task.cgi");
        assert!(paths.has_required());
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_usable_api_paths() {
        let mut config = Config::default();
        assert!(config.usable_api_paths().is_none());

        config.api_paths = Some([(TASK_API, "task.cgi")].into_iter().collect());
        assert!(config.usable_api_paths().is_none());

        config.api_paths = Some(
            [(AUTH_API, "auth.cgi"), (TASK_API, "task.cgi")]
                .into_iter()
                .collect(),
        );
        assert!(config.usable_api_paths().is_some());
    }

    #[test]
    fn test_file_format() {
        let config: Config = serde_json::from_str(
            r#"{"server": "https://nas.local", "user": "alice",
                "api_paths": {"SYNO.API.Auth": "auth.cgi", "SYNO.DownloadStation.Task": "task.cgi"}}"#,
        )
        .unwrap();
        assert_eq!(config.server, "https://nas.local");
        assert_eq!(config.download_dir, "");
        assert!(!config.verify_certificates);
        assert_eq!(config.api_paths.as_ref().unwrap().get(AUTH_API), Some("auth.cgi"));

        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("verify_certificates").is_none());
        assert_eq!(json["api_paths"]["SYNO.DownloadStation.Task"], "task.cgi");
    }
}
