//! Data models for the Trace crowdfunding backend.
//!
//! Catalog models match the frontend TypeScript interfaces; marketplace models
//! match the contract's wire format.

mod company;
mod market;
mod project;
mod store;

pub use company::*;
pub use market::*;
pub use project::*;
pub use store::*;
