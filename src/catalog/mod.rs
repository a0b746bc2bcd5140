//! Body parts and exercises, personal or group-scoped.

pub mod dto;
pub mod repo;
pub mod service;

pub use repo::{BodyPart, CatalogRepo, Exercise};
