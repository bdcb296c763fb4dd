//! Read-only project catalog.
//!
//! Everything here is a pure function over the static fixtures; nothing in
//! this module performs I/O or mutates data.

pub mod dashboard;
pub mod filter;
pub mod fixtures;
pub mod metrics;

use serde::Serialize;

use crate::models::Project;

pub use filter::{filter_projects, ProjectFilter};

/// Counters shown in the landing page hero.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub active_projects: usize,
    pub total_raised: u64,
}

pub fn summary(projects: &[Project]) -> CatalogSummary {
    CatalogSummary {
        active_projects: projects.len(),
        total_raised: projects.iter().map(|p| p.current_amount).sum(),
    }
}

/// Look up a project by id.
pub fn find_project<'a>(projects: &'a [Project], id: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.id == id)
}
