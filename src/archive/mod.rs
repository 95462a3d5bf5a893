pub mod export;
pub mod filter;
pub mod models;
pub mod services;
pub mod views;
