//! vertexai-gateway: HTTP front door for Gemini text generation.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
