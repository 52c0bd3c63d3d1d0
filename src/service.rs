//! Review Service
//!
//! The operations offered to the request-handling layer. Multi-step
//! mutations each run in one transaction; an early return drops the
//! transaction uncommitted, which rolls it back.

use chrono::Utc;
use tracing::{debug, info};

use crate::assignment::{self, RandomSource, REVIEWERS_PER_PULL_REQUEST};
use crate::database::models::*;
use crate::database::queries::Queries;
use crate::database::Database;
use crate::error::ServiceError;

#[derive(Clone)]
pub struct ReviewService {
    database: Database,
    random: RandomSource,
}

impl ReviewService {
    pub fn new(database: Database, random: RandomSource) -> Self {
        Self { database, random }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn create_team(&self, team: Team) -> Result<Team, ServiceError> {
        let mut tx = self.database.pool().begin().await?;

        if Queries::team_exists(&mut *tx, &team.team_name).await? {
            debug!(team_name = %team.team_name, "team already exists");
            return Err(ServiceError::TeamExists);
        }

        Queries::insert_team(&mut *tx, &team.team_name).await?;
        for member in &team.members {
            Queries::upsert_member(&mut *tx, &team.team_name, member).await?;
        }

        let created = Queries::get_team(&mut *tx, &team.team_name)
            .await?
            .ok_or_else(|| ServiceError::Internal("team missing after insert".to_string()))?;
        tx.commit().await?;

        info!(team_name = %created.team_name, members = created.members.len(), "team created");
        Ok(created)
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team, ServiceError> {
        let mut conn = self.database.pool().acquire().await?;
        Queries::get_team(&mut conn, team_name)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, ServiceError> {
        let mut conn = self.database.pool().acquire().await?;
        let user = Queries::set_user_active(&mut conn, user_id, is_active)
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(user_id, is_active, "user activity updated");
        Ok(user)
    }

    /// Create an OPEN pull request with up to two random reviewers drawn from
    /// the author's active teammates.
    pub async fn create_pull_request(&self, request: NewPullRequest) -> Result<PullRequest, ServiceError> {
        let mut tx = self.database.pool().begin().await?;

        let author = Queries::get_user(&mut *tx, &request.author_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if Queries::pull_request_exists(&mut *tx, &request.pull_request_id).await? {
            debug!(pull_request_id = %request.pull_request_id, "pull request id taken");
            return Err(ServiceError::PullRequestExists);
        }

        let candidates =
            assignment::eligible_reviewers(&mut *tx, &author.team_name, &author.user_id).await?;
        let reviewers = {
            let mut rng = self.random.rng();
            assignment::choose_initial_reviewers(&candidates, REVIEWERS_PER_PULL_REQUEST, &mut rng)
        };

        Queries::insert_pull_request(&mut *tx, &request, Utc::now())
            .await
            .map_err(map_unique_violation)?;
        for reviewer_id in &reviewers {
            Queries::insert_reviewer(&mut *tx, &request.pull_request_id, reviewer_id).await?;
        }

        let created = Queries::get_pull_request(&mut *tx, &request.pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::Internal("pull request missing after insert".to_string()))?;
        tx.commit().await?;

        info!(
            pull_request_id = %created.pull_request_id,
            author_id = %created.author_id,
            reviewers = ?created.assigned_reviewers,
            "pull request created"
        );
        Ok(created)
    }

    /// Idempotent: merging twice keeps the first `merged_at`.
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, ServiceError> {
        let mut conn = self.database.pool().acquire().await?;
        let merged = Queries::mark_merged(&mut conn, pull_request_id, Utc::now())
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(pull_request_id, "pull request merged");
        Ok(merged)
    }

    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, ServiceError> {
        let mut rng = self.random.rng();
        let mut tx = self.database.pool().begin().await?;
        let reassignment =
            assignment::reassign_reviewer(&mut *tx, pull_request_id, old_reviewer_id, &mut rng).await?;
        tx.commit().await?;
        Ok(reassignment)
    }

    pub async fn get_user_reviews(&self, user_id: &str) -> Result<UserReviews, ServiceError> {
        let mut conn = self.database.pool().acquire().await?;
        if Queries::get_user(&mut conn, user_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let pull_requests = Queries::list_pull_requests_by_reviewer(&mut conn, user_id).await?;
        Ok(UserReviews {
            user_id: user_id.to_string(),
            pull_requests,
        })
    }

    pub async fn get_assignment_stats(&self) -> Result<AssignmentStats, ServiceError> {
        let mut conn = self.database.pool().acquire().await?;
        assignment::assignment_counts(&mut conn).await
    }

    /// All-or-nothing: on any failure no user is deactivated and no reviewer
    /// row changes.
    pub async fn bulk_deactivate_team_users(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<BulkDeactivateResult, ServiceError> {
        let mut tx = self.database.pool().begin().await?;
        let result = assignment::deactivate_and_reassign(&mut *tx, team_name, user_ids).await?;
        tx.commit().await?;
        Ok(result)
    }
}

fn map_unique_violation(err: sqlx::Error) -> ServiceError {
    let unique = matches!(&err, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if unique {
        ServiceError::PullRequestExists
    } else {
        ServiceError::Database(err)
    }
}
