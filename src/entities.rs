use serde::Deserialize;

/// Response from Synology API
#[derive(Deserialize, Debug)]
pub struct SynologyResponse<D> {
    pub success: bool,
    pub data: Option<D>,
    pub error: Option<ApiError>,
}

impl<D> SynologyResponse<D> {
    /// Error code of a failed reply, `0` when the server sent none
    #[must_use]
    pub fn error_code(&self) -> i32 {
        self.error.as_ref().map_or(0, |error| error.code)
    }
}

/// Error information from Synology API
#[derive(Deserialize, Debug)]
pub struct ApiError {
    pub code: i32,
}

/// Authentication response data
#[derive(Deserialize, Debug)]
pub struct AuthData {
    /// Session ID used for authenticated requests
    pub sid: String,
    #[serde(default)]
    pub did: String,
}

/// One entry of the `SYNO.API.Info` reply
#[derive(Deserialize, Debug)]
pub struct ApiInfo {
    /// Request path relative to `/webapi/`
    pub path: String,
    #[serde(rename = "minVersion", default)]
    pub min_version: u32,
    #[serde(rename = "maxVersion", default)]
    pub max_version: u32,
    #[serde(rename = "requestFormat", default)]
    pub request_format: Option<String>,
}
