pub mod catalogs;
pub mod health;
pub mod metrics;
pub mod ratebook;
pub mod rates;
pub mod request_id;
