// Library exports so integration tests can drive the app.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod storage;
