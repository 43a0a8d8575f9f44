// transferdesk-api: Async Rust client for the portal's Supabase REST surface (RPC + PostgREST tables)

pub mod auth;
pub mod error;
pub mod rest;
pub mod transport;

pub use auth::ApiKeys;
pub use error::Error;
pub use rest::client::RestClient;
pub use rest::models::{AvailabilityRow, NewPackageRow, PackageRow, StatusPatch};
pub use rest::query::Query;
pub use transport::{TlsMode, TransportConfig};
