//! HTTP client for the Booker REST API.
//!
//! This module provides the request pipeline: token management, request
//! execution with a single retry, envelope unwrapping and pagination.
//!
//! # Example
//!
//! ```rust,ignore
//! use booker_sdk::client::{BookerClient, ClientConfig, Method, PageRequest};
//! use booker_sdk::types::Appointment;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://api-staging.booker.com/v4.1/customer")
//!         .with_credentials("client-id", "client-secret");
//!     let client = BookerClient::new(config)?;
//!
//!     let page = PageRequest::new(50).with_param("LocationID", 10257);
//!     let appointments: Vec<Appointment> = client
//!         .paginate(Method::POST, "/appointments", &page, true)
//!         .await?;
//!     println!("Found {} appointments", appointments.len());
//!
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod customer;
pub mod envelope;
pub mod http;
pub mod pagination;
pub mod request;
pub mod token;
mod transport;

pub use config::ClientConfig;
pub use customer::build_params;
pub use http::BookerClient;
pub use pagination::{PageRequest, SKIPPABLE_FAULT_CODE};
pub use request::{RequestDescriptor, VendorResponse};
pub use reqwest::Method;
pub use token::{
    AccessToken, Authenticator, ClientCredentialsAuthenticator, IssuedToken, TokenManager,
    TokenStore,
};
