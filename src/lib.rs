pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod services;
pub mod web;
