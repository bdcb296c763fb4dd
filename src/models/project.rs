//! Project model matching the frontend Project interface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of media attached to a project update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// A photo or video attached to an update as progress evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Poster frame, only meaningful for videos
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Where a project takes place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLocation {
    pub city: String,
    pub province: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
}

/// A funding sub-goal, released progressively as it gets verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target_amount: u64,
    pub current_amount: u64,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    /// Author-supplied, not recomputed from the amounts
    pub percentage: u8,
}

/// A timestamped progress post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
}

/// A crowdfunding project as shown in listings and detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub problem_solved: String,
    pub category: String,
    pub current_amount: u64,
    pub target_amount: u64,
    pub deadline: NaiveDate,
    pub location: ProjectLocation,
    pub milestones: Vec<Milestone>,
    pub updates: Vec<Update>,
    pub image_url: String,
    pub organization_name: String,
    pub verified: bool,
    pub donors_count: u32,
    pub days_left: u32,
}

/// Project enriched with the values the UI derives for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub funding_percentage: f64,
    pub funding_percentage_label: String,
    pub days_remaining: i64,
}
