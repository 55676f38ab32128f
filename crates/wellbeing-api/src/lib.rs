// wellbeing-api: Async Rust client for the Electrolux/AEG Wellbeing cloud API

pub mod appliances;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Credentials, fetch_client_token, login};
pub use client::{AuthenticatedClient, REFRESH_STATUS_CODES};
pub use error::Error;
pub use models::{ApplianceData, ApplianceEntry, ApplianceInfo, ReportedState};
pub use transport::{Endpoints, TransportConfig};
