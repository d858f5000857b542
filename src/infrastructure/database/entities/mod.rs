//! Database entities module

pub mod catalog;
pub mod catalog_rate;
pub mod rate;
pub mod ratebook_entry;

pub use catalog::Entity as Catalog;
pub use catalog_rate::Entity as CatalogRate;
pub use rate::Entity as Rate;
pub use ratebook_entry::Entity as RatebookEntry;
