//! Booker SDK - Rust client library for the Booker v4.1 REST API.
//!
//! This crate wraps the vendor's HTTP API with the plumbing every call
//! needs: access-token caching and refresh, response classification, a
//! single retry, envelope unwrapping and paged listing.
//!
//! # Client
//!
//! - [`BookerClient`] - Request executor and paginator
//! - [`ClientConfig`] - Base URL, credentials, timeouts, tracing toggle
//! - [`PageRequest`] - Page cursor for [`BookerClient::paginate`]
//!
//! # Records
//!
//! - [`Appointment`], [`Customer`], [`Treatment`], [`Sale`]
//! - [`Mapped`] - One record, many records, or the raw payload
//!
//! # Hooks
//!
//! - [`TokenStore`] - Persist tokens across restarts
//! - [`IssueLogger`] - Receive recoverable issues such as skipped pages
//!
//! # Example
//!
//! ```rust
//! use booker_sdk::{ClientConfig, PageRequest};
//!
//! let config = ClientConfig::new("https://api-staging.booker.com/v4.1/customer")
//!     .with_credentials("client-id", "client-secret");
//! assert!(config.validate().is_ok());
//!
//! let page = PageRequest::new(25).with_param("LocationID", 10257);
//! assert!(page.validate().is_ok());
//! ```

pub mod client;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use client::{BookerClient, ClientConfig, PageRequest, TokenStore};
pub use diagnostics::{IssueContext, IssueLogger, NoopIssueLogger, TracingIssueLogger};
pub use error::{ApiFailure, BookerError, Result};
pub use types::{Appointment, Customer, Mapped, Resource, ResourceKind, Sale, Treatment};
