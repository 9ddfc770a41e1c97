//! Session handling: interactive login and reuse of the stored session ID.

use crate::client::{SynoClient, SynoError};
use crate::config::Config;
use crate::prompt::Prompter;
use crate::store::Store;
use anyhow::Result;
use log::{debug, info, warn};

/// Asks for password and one-time code, logs in and stores the new session ID
///
/// User-facing failures are shown through `prompter` and yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error only if the session file cannot be written
pub async fn login<P>(
    client: &SynoClient,
    config: &Config,
    store: &Store,
    prompter: &mut P,
) -> Result<Option<String>>
where
    P: Prompter + ?Sized,
{
    let Some(password) = prompter
        .ask_secret("Password", "Enter your Synology password:")
        .filter(|password| !password.is_empty())
    else {
        prompter.error("Login error", "Password is required.");
        return Ok(None);
    };

    let Some(otp) = prompter
        .ask_text("OTP", "Please enter your 2FA OTP:", "")
        .map(|otp| otp.trim().to_string())
        .filter(|otp| !otp.is_empty())
    else {
        prompter.error("Login error", "OTP is required.");
        return Ok(None);
    };

    match client.login(&config.user, &password, &otp).await {
        Ok(sid) => {
            store.save_sid(&sid)?;
            info!("Obtained a new session for {}", config.user);
            prompter.info("Login", "SID obtained and saved ✅");
            Ok(Some(sid))
        }
        Err(err) => {
            warn!("Login failed: {err:#}");
            let message = match err.downcast_ref::<SynoError>() {
                Some(SynoError::Auth(payload)) => payload.clone(),
                _ => format!("{err:#}"),
            };
            prompter.error("Login error", &message);
            Ok(None)
        }
    }
}

/// Returns the stored session ID if the server still accepts it, otherwise logs in
///
/// # Errors
///
/// Returns an error if the session file cannot be read or written
pub async fn ensure_session<P>(
    client: &SynoClient,
    config: &Config,
    store: &Store,
    prompter: &mut P,
) -> Result<Option<String>>
where
    P: Prompter + ?Sized,
{
    if let Some(sid) = store.load_sid()? {
        if client.check_sid(&sid).await {
            debug!("Reusing stored session");
            return Ok(Some(sid));
        }
        info!("Stored session is no longer valid");
    }

    login(client, config, store, prompter).await
}
