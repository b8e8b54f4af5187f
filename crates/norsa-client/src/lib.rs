//! # norsa-client: Backend Gateway for the Norsa Terminal
//!
//! Typed access to the merchant REST backend.
//!
//! ## Module Organization
//!
//! - [`api`] - The [`MerchantApi`] trait the workflows are written against
//! - [`gateway`] - reqwest implementation
//! - [`token`] - Bearer token sources
//! - [`wire`] - JSON request/response shapes
//! - [`config`] - Base URL, timeout, endpoint paths
//! - [`error`] - Gateway error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use norsa_client::{Gateway, GatewayConfig, MerchantApi, StoredSessionToken};
//!
//! let gateway = Gateway::new(&GatewayConfig::default(), StoredSessionToken::new(db))?;
//! let issuance = gateway.get_issuance_history("NRS-42").await?;
//! ```

#![allow(async_fn_in_trait)]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod token;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::MerchantApi;
pub use config::{Endpoints, GatewayConfig};
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use token::{StaticToken, StoredSessionToken, TokenSource};
pub use wire::DailyPrintCheck;
