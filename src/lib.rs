pub mod avatar;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod persona;
pub mod pipeline;
pub mod prompts;
pub mod transport;
pub mod validation;
