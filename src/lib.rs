pub mod config;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;
pub mod swagger;
pub mod tasks;
pub mod utils;
pub mod views;

pub use config::Config;
pub use error::{AppError, AppResult};
