//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The GitHub mock is scripted per repository: tests declare the pages,
//! pending responses and failures up front, then inspect the request log.
//! HTTP-level behavior of the real client is covered with wiremock in
//! `adapters::github::client`.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
