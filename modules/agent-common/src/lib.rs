//! Plumbing shared by every agent service: configuration, the error type,
//! and the secret, document and generative-text collaborators.

pub mod config;
pub mod documents;
pub mod error;
pub mod genai;
pub mod secrets;
pub mod server;

pub use error::AgentError;
