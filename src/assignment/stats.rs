use sqlx::SqliteConnection;

use crate::database::models::AssignmentStats;
use crate::database::queries::Queries;
use crate::error::ServiceError;

/// Live assignment counts per reviewer, ordered by user id.
pub async fn assignment_counts(conn: &mut SqliteConnection) -> Result<AssignmentStats, ServiceError> {
    let reviewers = Queries::assignment_counts(conn).await?;
    Ok(AssignmentStats { reviewers })
}

impl AssignmentStats {
    pub fn total(&self) -> i64 {
        self.reviewers.iter().map(|stat| stat.assignments).sum()
    }

    pub fn for_user(&self, user_id: &str) -> i64 {
        self.reviewers
            .iter()
            .find(|stat| stat.user_id == user_id)
            .map(|stat| stat.assignments)
            .unwrap_or(0)
    }
}
