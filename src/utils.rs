/// Scheme marker a magnet link must start with
pub const MAGNET_SCHEME: &str = "magnet:";

/// Download Station error codes returned by task creation
pub const TASK_ERROR_CODES: &[(i32, &str)] = &[
    (400, "File upload failed"),
    (401, "Maximum number of downloads reached"),
    (402, "Destination folder denied (insufficient permissions)"),
    (403, "Destination folder does not exist"),
    (404, "Invalid task id"),
    (405, "Invalid task action"),
    (406, "No default destination set"),
    (407, "Error setting destination"),
    (408, "File does not exist"),
];

/// Maps a task error code to a human-readable reason
#[must_use]
pub fn task_error_message(code: i32) -> String {
    TASK_ERROR_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or_else(
            || format!("Unknown error (code {code})"),
            |(_, message)| (*message).to_string(),
        )
}

#[must_use]
pub fn is_magnet_link(arg: &str) -> bool {
    arg.starts_with(MAGNET_SCHEME)
}

/// Joins the server base URL with a path relative to `/webapi/`
#[must_use]
pub fn webapi_url(host: &str, path: &str) -> String {
    format!(
        "{}/webapi/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
