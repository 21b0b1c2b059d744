//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: a validated query to send to the backend
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod query;
pub mod string;
