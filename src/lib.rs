pub mod aliases;
pub mod app_error;
pub mod app_state;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod domain;
pub mod models;
pub mod routes;
pub mod schema;
pub mod swagger;
