//! Domain entities
//!
//! Everything here is created fresh for one run and discarded afterwards.

pub mod contribution;
pub mod ledger;
pub mod repository;

pub use contribution::{AuthorRef, CommitRecord, WeeklyContribution};
pub use ledger::{IdentityDetails, IdentityKind, LedgerFragment, Summary};
pub use repository::{Organization, Repository};
