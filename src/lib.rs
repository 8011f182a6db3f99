pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod guard;
pub mod models;
pub mod repository;
pub mod session;
pub mod types;
pub mod validation;
