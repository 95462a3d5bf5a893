pub mod grid;
pub mod lifecycle;
pub mod logs;
pub mod models;
pub mod notes;
pub mod services;
pub mod views;
