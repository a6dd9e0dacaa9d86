pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod transport;

pub use config::ClientConfig;
pub use error::ClientError;
pub use service::{SheetsService, SPREADSHEET_MIME_TYPE};
pub use telemetry::init_tracing;
pub use transport::{Api, ApiRequest, HttpTransport, Method, Transport};

/// Build a service that talks to the live Google APIs using `config`
pub fn connect(config: ClientConfig) -> SheetsService<HttpTransport> {
    SheetsService::new(HttpTransport::new(config))
}
