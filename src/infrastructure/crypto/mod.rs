//! Token verification for the identity collaborator

pub mod jwt;
