pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod routes;
