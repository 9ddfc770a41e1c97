use crate::client::SynoClient;
use crate::config::{ApiPaths, Config};
use crate::prompt::Prompter;
use crate::session::ensure_session;
use crate::store::Store;
use crate::utils::is_magnet_link;
use anyhow::Result;
use log::{info, warn};

pub const USAGE: &str = "Usage:\n  synomagnet --settings   (configure)\n  synomagnet magnet:?xt=...  (start download)";
pub const NO_CONFIG: &str =
    "No config found! Run 'synomagnet --settings' and let the app discover the API.";

const SETTINGS_TITLE: &str = "Synology Magnet Settings";
const SETTINGS_ACTIONS: &[&str] = &["Check endpoints", "Save", "Edit settings", "Quit"];

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Settings,
    Magnet(String),
    Usage,
}

impl Command {
    #[must_use]
    pub fn from_args(settings: bool, link: Option<String>) -> Self {
        if settings {
            return Self::Settings;
        }
        match link {
            Some(link) if is_magnet_link(&link) => Self::Magnet(link),
            _ => Self::Usage,
        }
    }
}

/// How a command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Usage,
    /// No configuration, or one without the required API paths
    MissingConfig,
    Configured,
    Cancelled,
    Submitted { destination: String },
    /// Reported to the user through a notice
    Failed,
}

impl Outcome {
    /// Text printed to the console rather than shown in a dialog
    #[must_use]
    pub fn console_message(&self) -> Option<&'static str> {
        match self {
            Self::Usage => Some(USAGE),
            Self::MissingConfig => Some(NO_CONFIG),
            _ => None,
        }
    }
}

pub struct App<P> {
    store: Store,
    prompter: P,
}

impl<P: Prompter> App<P> {
    pub fn new(store: Store, prompter: P) -> Self {
        Self { store, prompter }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// # Errors
    ///
    /// Returns an error if the local files cannot be read or written
    pub async fn run(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Settings => self.settings().await,
            Command::Magnet(link) => self.send_magnet(&link).await,
            Command::Usage => Ok(Outcome::Usage),
        }
    }

    /// Settings form: edit fields, check endpoints, save
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be written
    pub async fn settings(&mut self) -> Result<Outcome> {
        // An unreadable file is replaced on save
        let mut config = match self.store.load_config() {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                warn!("Ignoring existing configuration: {err:#}");
                Config::default()
            }
        };
        if !self.edit_fields(&mut config) {
            return Ok(Outcome::Cancelled);
        }

        loop {
            match self
                .prompter
                .choose(SETTINGS_TITLE, "Choose an action", SETTINGS_ACTIONS)
            {
                Some(0) => self.check_endpoints(&config).await,
                Some(1) => {
                    if self.save(config.clone()).await? {
                        return Ok(Outcome::Configured);
                    }
                }
                Some(2) => {
                    if !self.edit_fields(&mut config) {
                        return Ok(Outcome::Cancelled);
                    }
                }
                _ => return Ok(Outcome::Cancelled),
            }
        }
    }

    fn edit_fields(&mut self, config: &mut Config) -> bool {
        let fields: [(&str, &mut String); 4] = [
            ("NAS URL:", &mut config.server),
            ("User:", &mut config.user),
            ("Default folder:", &mut config.download_dir),
            ("Conversion folder:", &mut config.conversion_dir),
        ];

        for (label, value) in fields {
            match self.prompter.ask_text(SETTINGS_TITLE, label, value.as_str()) {
                Some(answer) => *value = answer.trim().to_string(),
                None => return false,
            }
        }
        true
    }

    async fn check_endpoints(&mut self, config: &Config) {
        match discover(config).await {
            Ok(_) => self
                .prompter
                .info("API", "API endpoints successfully discovered!"),
            Err(err) => {
                warn!("Endpoint check failed: {err:#}");
                self.prompter.error(
                    "Error",
                    "Unable to get endpoints, check your NAS URL and its status.",
                );
            }
        }
    }

    /// Rediscovers the API layout and persists `config` with it
    async fn save(&mut self, mut config: Config) -> Result<bool> {
        let paths = match discover(&config).await {
            Ok(paths) if paths.has_required() => paths,
            result => {
                if let Err(err) = result {
                    warn!("Endpoint discovery failed: {err:#}");
                }
                self.prompter.error(
                    "API",
                    "DownloadStation and/or Auth endpoints not found! Check your NAS URL and Download Station status.",
                );
                return Ok(false);
            }
        };

        config.api_paths = Some(paths);
        self.store.save_config(&config)?;
        info!("Saved configuration to {}", self.store.config_file().display());
        self.prompter
            .info("Saved", "Configuration and endpoint mapping saved ✅");
        Ok(true)
    }

    /// Submits `link` to Download Station
    ///
    /// # Errors
    ///
    /// Returns an error if the local files cannot be read or written
    pub async fn send_magnet(&mut self, link: &str) -> Result<Outcome> {
        if !is_magnet_link(link) {
            return Ok(Outcome::Usage);
        }

        let Some(config) = self
            .store
            .load_config()?
            .filter(|config| config.usable_api_paths().is_some())
        else {
            return Ok(Outcome::MissingConfig);
        };

        let client = match SynoClient::for_config(&config) {
            Ok(client) => client,
            Err(err) => {
                self.prompter.error("Error", &format!("{err:#}"));
                return Ok(Outcome::Failed);
            }
        };

        let Some(sid) = ensure_session(&client, &config, &self.store, &mut self.prompter).await?
        else {
            return Ok(Outcome::Failed);
        };

        let destination = self.ask_destination(&config);
        match client.create_task(&sid, link, &destination).await {
            Ok(()) => {
                info!("Magnet sent to {destination}");
                self.prompter.info(
                    "OK",
                    &format!("Magnet sent to Download Station!\nFolder: {destination}"),
                );
                Ok(Outcome::Submitted { destination })
            }
            Err(err) => {
                warn!("Task creation failed: {err:#}");
                self.prompter.error("Error", &format!("{err:#}"));
                Ok(Outcome::Failed)
            }
        }
    }

    fn ask_destination(&mut self, config: &Config) -> String {
        if self.prompter.confirm(
            "Download Destination",
            "Do you want to use the conversion folder?",
        ) {
            config.conversion_dir.clone()
        } else {
            config.download_dir.clone()
        }
    }
}

async fn discover(config: &Config) -> Result<ApiPaths> {
    SynoClient::for_config(config)?.discover().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_args() {
        assert_eq!(Command::from_args(true, None), Command::Settings);
        assert_eq!(
            Command::from_args(true, Some("magnet:?xt=urn:btih:abc".into())),
            Command::Settings
        );
        assert_eq!(
            Command::from_args(false, Some("magnet:?xt=urn:btih:abc".into())),
            Command::Magnet("magnet:?xt=urn:btih:abc".into())
        );
        assert_eq!(
            Command::from_args(false, Some("https://example.com/a.torrent".into())),
            Command::Usage
        );
        assert_eq!(Command::from_args(false, None), Command::Usage);
    }

    #[test]
    fn test_console_messages() {
        assert_eq!(Outcome::Usage.console_message(), Some(USAGE));
        assert_eq!(Outcome::MissingConfig.console_message(), Some(NO_CONFIG));
        assert_eq!(Outcome::Failed.console_message(), None);
        assert_eq!(USAGE.lines().count(), 3);
    }
}
