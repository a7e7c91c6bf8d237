pub mod client;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod models;
pub mod render;

pub use client::{AgentApi, HttpAgentClient};
pub use config::ClientConfig;
pub use controller::{Phase, RunController, RunEvent, RunSnapshot};
pub use error::{Error, RequestFailure, Result};
