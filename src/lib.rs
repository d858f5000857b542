//! # Ratebook tariff engine
//!
//! Keeps per-client shipping tariffs (the ratebook) consistent with the
//! shared rate catalogs they were copied from, and resolves the tariff a
//! shipment is priced with.
//!
//! ## Layout
//!
//! - **domain**: rates, catalogs, ratebook entries and the resolution rules
//! - **application**: registries, the propagation engine and the resolver
//! - **infrastructure**: SeaORM storage, migrations and token verification
//! - **interfaces**: the REST API with its OpenAPI document
//! - **server**: process runtime and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::{create_api_router, AppState, RouterOptions};
pub use server::{init_tracing, ServerHandle, ServerOptions};
