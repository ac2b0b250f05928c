pub mod api;
pub mod api_config;
pub mod authenticated_client;
pub mod config;
pub mod constants;
pub mod credential_store;
pub mod error;
pub mod logging;
pub mod repository;
pub mod view_model;

pub use api::{
    ApiEnvelope, ApiError, AvailabilityResponse, AvailabilitySummary, BackupItem, ControlAction,
    ControlActionResult, MonitoringSettings, MonitoringSettingsRequest, ProxmoxBackupsResponse,
    ServerAvailability,
};
pub use authenticated_client::{AuthenticatedClient, Endpoint, TokenProvider};
pub use config::AppConfig;
pub use credential_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{MonitorError, Result};
pub use repository::MonitoringRepository;
pub use view_model::{AppTab, MainUiState, MainViewModel};
