use std::env;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OAuth bearer token sent with every request
    pub access_token: String,
    /// Sheets API root
    pub sheets_base_url: String,
    /// Drive API root (used to find spreadsheets by name)
    pub drive_base_url: String,
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
        }
    }

    /// Load configuration from environment variables (and a `.env` file if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let access_token = env::var("SHEETS_ACCESS_TOKEN")
            .map_err(|_| anyhow::anyhow!("SHEETS_ACCESS_TOKEN is not set"))?;
        let sheets_base_url = env::var("SHEETS_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SHEETS_BASE_URL.to_string());
        let drive_base_url = env::var("DRIVE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_DRIVE_BASE_URL.to_string());

        Ok(Self {
            access_token,
            sheets_base_url: sheets_base_url.trim_end_matches('/').to_string(),
            drive_base_url: drive_base_url.trim_end_matches('/').to_string(),
        })
    }
}
