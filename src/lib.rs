//!# Synology Magnet
//!
//! Sends magnet links to Synology Download Station from the desktop.
//!
//! ## Features
//!
//! - One-time discovery of the NAS API layout (`SYNO.API.Info`)
//! - Login with password and 2FA one-time code
//! - Reuse of the stored session ID while the server accepts it
//! - Download task creation with a choice of two destination folders
//! - Human-readable Download Station error messages
//!
//! ## Security
//!
//! TLS certificates are **not** verified by default, since most NAS units
//! serve self-signed or LAN-only certificates. Set `"verify_certificates": true`
//! in the configuration file to turn validation back on.
//!
//! ## Usage example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use synomagnet::client::SynoClient;
//! use synomagnet::prompt::TerminalPrompter;
//! use synomagnet::session::ensure_session;
//! use synomagnet::store::Store;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let store = Store::from_home()?;
//!     let Some(config) = store.load_config()? else {
//!         return Ok(());
//!     };
//!
//!     let client = SynoClient::for_config(&config)?;
//!     let mut prompter = TerminalPrompter::new();
//!     if let Some(sid) = ensure_session(&client, &config, &store, &mut prompter).await? {
//!         client
//!             .create_task(&sid, "magnet:?xt=urn:btih:...", &config.download_dir)
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod entities;
pub mod prompt;
pub mod session;
pub mod store;
pub mod utils;
