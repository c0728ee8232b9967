pub mod config;
pub mod evaluations;
pub mod health;
pub mod materials;
pub mod qa;
pub mod sessions;
pub mod upload;
