use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid weight range: weight_min {min} must be lower than weight_max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Rate {rate_id} is already assigned to catalog {catalog_id}")]
    DuplicateAssignment { catalog_id: i32, rate_id: i32 },

    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
