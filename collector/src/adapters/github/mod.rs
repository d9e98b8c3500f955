//! GitHub adapter
//!
//! Implementation of the GitHub client over the REST and GraphQL APIs.

pub mod client;
mod graphql;

pub use client::GitHubClientImpl;
