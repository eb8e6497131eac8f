pub mod api;
pub mod auth;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod services;
pub mod source;
pub mod state;
