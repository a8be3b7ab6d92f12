pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod service;

pub use error::{Error, Result};
