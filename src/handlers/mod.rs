pub mod admin;
pub mod auth;
pub mod forms;
pub mod health;
pub mod plants;
