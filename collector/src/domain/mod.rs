//! Domain layer
//!
//! Contains the data model of a collection run with no I/O.
//! - `entities`: Repositories, contributions, ledger fragments and summaries
//! - `ports`: Trait definitions for the remote API and observability

pub mod entities;
pub mod ports;
