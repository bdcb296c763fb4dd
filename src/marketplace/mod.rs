//! Marketplace ledger.
//!
//! A local SQLite rendition of the on-chain marketplace contract: projects
//! with milestones and updates, per-project donation sequences, donor/project
//! marks and impacted-people counts. Every write bumps the store revision in
//! the same transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use thiserror::Error;

use crate::db::Repository;
use crate::models::{
    CreateProjectRequest, MarketDonation, MarketLocation, MarketMilestone, MarketProject,
    MarketStats, MarketSummary, MarketUpdate,
};

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("caller is not the project owner")]
    NotAuthorized,
    #[error("project {0} not found")]
    ProjectNotFound(u64),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("stored record is malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const PROJECT_COLUMNS: &str = "id, owner, name, deadline_ts, current_amount, target_amount, \
     problem_statement, impact_area, location, milestones, updates";

#[derive(Clone)]
pub struct Marketplace {
    pool: SqlitePool,
}

impl Marketplace {
    pub fn new(repo: &Repository) -> Self {
        Self {
            pool: repo.pool().clone(),
        }
    }

    /// Register a project. Ids start at 1.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<u64, MarketError> {
        if request.target_amount <= 0 {
            return Err(MarketError::InvalidArgument(
                "target_amount must be positive".to_string(),
            ));
        }
        if request.name.is_empty() {
            return Err(MarketError::InvalidArgument("name is required".to_string()));
        }

        let location = to_json(&request.location)?;
        let milestones = to_json(&request.milestones)?;

        let mut tx = self.pool.begin().await?;
        let next: i64 = sqlx::query("SELECT COALESCE(MAX(id), 0) + 1 AS next FROM market_projects")
            .fetch_one(&mut *tx)
            .await?
            .get("next");

        sqlx::query(
            "INSERT INTO market_projects (id, owner, name, deadline_ts, current_amount, target_amount, problem_statement, impact_area, location, milestones, updates) VALUES (?, ?, ?, ?, '0', ?, ?, ?, ?, ?, '[]')"
        )
        .bind(next)
        .bind(&request.owner)
        .bind(&request.name)
        .bind(request.deadline_ts.to_string())
        .bind(request.target_amount.to_string())
        .bind(&request.problem_statement)
        .bind(&request.impact_area)
        .bind(&location)
        .bind(&milestones)
        .execute(&mut *tx)
        .await?;

        Repository::increment_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(project = next, owner = %request.owner, "Marketplace project created");
        Ok(next as u64)
    }

    pub async fn get_project(&self, id: u64) -> Result<MarketProject, MarketError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM market_projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => project_from_row(&row),
            None => Err(MarketError::ProjectNotFound(id)),
        }
    }

    /// Projects with an id greater than `start_after`, in id order.
    pub async fn list_projects(
        &self,
        start_after: u64,
        limit: u32,
    ) -> Result<Vec<MarketProject>, MarketError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM market_projects WHERE id > ? ORDER BY id LIMIT ?",
            PROJECT_COLUMNS
        ))
        .bind(i64::try_from(start_after).unwrap_or(i64::MAX))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    /// Record a donation and return its per-project sequence number.
    pub async fn donate(
        &self,
        project_id: u64,
        donor: &str,
        amount: i128,
        timestamp: i128,
    ) -> Result<u64, MarketError> {
        if amount <= 0 {
            return Err(MarketError::InvalidArgument(
                "amount must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        // Taking the sequence first acquires the write lock for the rest
        let row = sqlx::query(
            "UPDATE market_projects SET donation_seq = donation_seq + 1 WHERE id = ? RETURNING donation_seq, current_amount"
        )
        .bind(project_id as i64)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(MarketError::ProjectNotFound(project_id))?;

        let seq: i64 = row.get("donation_seq");
        let current = parse_amount(&row, "current_amount")?;
        let current = current
            .checked_add(amount)
            .ok_or_else(|| MarketError::InvalidArgument("amount overflows project total".to_string()))?;

        sqlx::query("UPDATE market_projects SET current_amount = ? WHERE id = ?")
            .bind(current.to_string())
            .bind(project_id as i64)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO market_donations (project_id, seq, donor, amount, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(project_id as i64)
        .bind(seq)
        .bind(donor)
        .bind(amount.to_string())
        .bind(timestamp.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO market_donor_marks (donor, project_id) VALUES (?, ?)")
            .bind(donor)
            .bind(project_id as i64)
            .execute(&mut *tx)
            .await?;

        Repository::increment_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(project = project_id, seq, "Donation recorded");
        Ok(seq as u64)
    }

    pub async fn add_update(
        &self,
        project_id: u64,
        owner: &str,
        title: &str,
        body: &str,
        timestamp: i128,
    ) -> Result<(), MarketError> {
        let mut tx = self.pool.begin().await?;
        let mut project = owned_project(&mut tx, project_id, owner).await?;
        project.updates.push(MarketUpdate {
            title: title.to_string(),
            body: body.to_string(),
            timestamp,
        });

        sqlx::query("UPDATE market_projects SET updates = ? WHERE id = ?")
            .bind(to_json(&project.updates)?)
            .bind(project_id as i64)
            .execute(&mut *tx)
            .await?;

        Repository::increment_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn complete_milestone(
        &self,
        project_id: u64,
        owner: &str,
        index: u32,
    ) -> Result<(), MarketError> {
        let mut tx = self.pool.begin().await?;
        let mut project = owned_project(&mut tx, project_id, owner).await?;
        let milestone = project
            .milestones
            .get_mut(index as usize)
            .ok_or_else(|| {
                MarketError::InvalidArgument(format!("milestone index {} out of range", index))
            })?;
        milestone.completed = true;
        tracing::info!(project = project_id, milestone = %milestone.title, "Milestone completed");

        sqlx::query("UPDATE market_projects SET milestones = ? WHERE id = ?")
            .bind(to_json(&project.milestones)?)
            .bind(project_id as i64)
            .execute(&mut *tx)
            .await?;

        Repository::increment_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_summary(&self, project_id: u64) -> Result<MarketSummary, MarketError> {
        let p = self.get_project(project_id).await?;
        Ok(MarketSummary {
            percent_bp: p.percent_bp(),
            name: p.name,
            current_amount: p.current_amount,
            target_amount: p.target_amount,
        })
    }

    pub async fn get_location(&self, project_id: u64) -> Result<MarketLocation, MarketError> {
        Ok(self.get_project(project_id).await?.location)
    }

    pub async fn get_impact_area(&self, project_id: u64) -> Result<String, MarketError> {
        Ok(self.get_project(project_id).await?.impact_area)
    }

    pub async fn get_problem_statement(&self, project_id: u64) -> Result<String, MarketError> {
        Ok(self.get_project(project_id).await?.problem_statement)
    }

    pub async fn list_updates(&self, project_id: u64) -> Result<Vec<MarketUpdate>, MarketError> {
        Ok(self.get_project(project_id).await?.updates)
    }

    pub async fn list_milestones(
        &self,
        project_id: u64,
    ) -> Result<Vec<MarketMilestone>, MarketError> {
        Ok(self.get_project(project_id).await?.milestones)
    }

    /// Donations with a sequence greater than `start_after_seq`, in order.
    pub async fn list_donations(
        &self,
        project_id: u64,
        start_after_seq: u64,
        limit: u32,
    ) -> Result<Vec<MarketDonation>, MarketError> {
        let rows = sqlx::query(
            "SELECT project_id, seq, donor, amount, timestamp FROM market_donations WHERE project_id = ? AND seq > ? ORDER BY seq LIMIT ?"
        )
        .bind(project_id as i64)
        .bind(i64::try_from(start_after_seq).unwrap_or(i64::MAX))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(donation_from_row).collect()
    }

    pub async fn set_impacted_people(
        &self,
        project_id: u64,
        owner: &str,
        impacted_people: i128,
    ) -> Result<(), MarketError> {
        let mut tx = self.pool.begin().await?;
        owned_project(&mut tx, project_id, owner).await?;
        if impacted_people < 0 {
            return Err(MarketError::InvalidArgument(
                "impacted_people must not be negative".to_string(),
            ));
        }

        sqlx::query("UPDATE market_projects SET impacted_people = ? WHERE id = ?")
            .bind(impacted_people.to_string())
            .bind(project_id as i64)
            .execute(&mut *tx)
            .await?;

        Repository::increment_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Zero when never set, including for unknown projects.
    pub async fn get_impacted_people(&self, project_id: u64) -> Result<i128, MarketError> {
        let row = sqlx::query("SELECT impacted_people FROM market_projects WHERE id = ?")
            .bind(project_id as i64)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => parse_optional_amount(&row, "impacted_people"),
            None => Ok(0),
        }
    }

    /// Sum of impacted people over every project the donor funded.
    pub async fn get_donor_impacted_people(&self, donor: &str) -> Result<i128, MarketError> {
        let rows = sqlx::query(
            "SELECT p.impacted_people FROM market_donor_marks m JOIN market_projects p ON p.id = m.project_id WHERE m.donor = ?"
        )
        .bind(donor)
        .fetch_all(&self.pool)
        .await?;

        let mut sum: i128 = 0;
        for row in &rows {
            sum = sum.saturating_add(parse_optional_amount(row, "impacted_people")?);
        }
        Ok(sum)
    }

    pub async fn get_dashboard_stats(&self, project_id: u64) -> Result<MarketStats, MarketError> {
        let project = self.get_project(project_id).await?;
        let donations_count: i64 =
            sqlx::query("SELECT donation_seq FROM market_projects WHERE id = ?")
                .bind(project_id as i64)
                .fetch_one(&self.pool)
                .await?
                .get("donation_seq");

        Ok(MarketStats {
            current_amount: project.current_amount,
            target_amount: project.target_amount,
            percent_bp: project.percent_bp(),
            donations_count: donations_count as u64,
            milestones_completed: project.milestones.iter().filter(|m| m.completed).count() as u32,
            milestones_total: project.milestones.len() as u32,
            last_update_ts: project.updates.last().map(|u| u.timestamp).unwrap_or(0),
        })
    }
}

/// Load a project inside `tx` and check that `owner` owns it.
async fn owned_project(
    tx: &mut Transaction<'_, Sqlite>,
    project_id: u64,
    owner: &str,
) -> Result<MarketProject, MarketError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM market_projects WHERE id = ?",
        PROJECT_COLUMNS
    ))
    .bind(project_id as i64)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(MarketError::ProjectNotFound(project_id))?;

    let project = project_from_row(&row)?;
    if project.owner != owner {
        return Err(MarketError::NotAuthorized);
    }
    Ok(project)
}

fn project_from_row(row: &SqliteRow) -> Result<MarketProject, MarketError> {
    let id: i64 = row.get("id");
    Ok(MarketProject {
        id: id as u64,
        owner: row.get("owner"),
        name: row.get("name"),
        deadline_ts: parse_amount(row, "deadline_ts")?,
        current_amount: parse_amount(row, "current_amount")?,
        target_amount: parse_amount(row, "target_amount")?,
        problem_statement: row.get("problem_statement"),
        impact_area: row.get("impact_area"),
        location: from_json(row, "location")?,
        milestones: from_json(row, "milestones")?,
        updates: from_json(row, "updates")?,
    })
}

fn donation_from_row(row: &SqliteRow) -> Result<MarketDonation, MarketError> {
    let project_id: i64 = row.get("project_id");
    let seq: i64 = row.get("seq");
    Ok(MarketDonation {
        seq: seq as u64,
        project_id: project_id as u64,
        donor: row.get("donor"),
        amount: parse_amount(row, "amount")?,
        timestamp: parse_amount(row, "timestamp")?,
    })
}

fn parse_amount(row: &SqliteRow, column: &str) -> Result<i128, MarketError> {
    let text: String = row.get(column);
    text.parse()
        .map_err(|_| MarketError::Malformed(format!("{} = {:?}", column, text)))
}

fn parse_optional_amount(row: &SqliteRow, column: &str) -> Result<i128, MarketError> {
    let text: Option<String> = row.get(column);
    match text {
        Some(text) => text
            .parse()
            .map_err(|_| MarketError::Malformed(format!("{} = {:?}", column, text))),
        None => Ok(0),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, MarketError> {
    serde_json::to_string(value).map_err(|e| MarketError::Malformed(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T, MarketError> {
    let text: String = row.get(column);
    serde_json::from_str(&text).map_err(|e| MarketError::Malformed(format!("{}: {}", column, e)))
}
