//! Client for the pqpass server.
//!
//! - account registration ([`account`])
//! - challenge-response login yielding a session secret ([`handshake`])
//! - bulk retrieval with concurrent decryption, and upload ([`retrieval`])
//! - sharing via per-share KEM encapsulation ([`sharing`])
//! - [`PqPassClient`], which ties these to one identity

pub mod account;
pub mod api_client;
pub mod client;
pub mod config;
pub mod error;
pub mod handshake;
pub mod retrieval;
pub mod sharing;
pub mod types;

pub use account::Registration;
pub use client::PqPassClient;
pub use config::CloudConfig;
pub use error::{CloudError, CloudResult, HandshakeStage};
pub use handshake::{Session, SessionState};
