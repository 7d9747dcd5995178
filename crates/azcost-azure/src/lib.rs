//! # azcost-azure
//!
//! Azure implementations of the azcost collaborator traits:
//!
//! - [`AzureCliSession`] / [`StaticSession`] - subscription and access token
//! - [`AzureClient`] - resource group listing and Cost Management queries
//!   over the Azure Resource Manager REST API

pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::AzureClient;
pub use error::{AzureError, Result};
pub use session::{AccessTokenProvider, AzureCliSession, StaticSession, detect_session};
