use sqlx::SqliteConnection;
use std::collections::BTreeSet;

use crate::database::models::User;
use crate::database::queries::Queries;
use crate::error::ServiceError;

/// Active members of `team_name` other than `exclude_user_id`, by user id.
pub async fn eligible_reviewers(
    conn: &mut SqliteConnection,
    team_name: &str,
    exclude_user_id: &str,
) -> Result<Vec<User>, ServiceError> {
    Ok(Queries::list_active_team_members_except(conn, team_name, exclude_user_id).await?)
}

/// A candidate conflicts when it authored the pull request or already
/// reviews it.
pub fn is_conflict(candidate_id: &str, author_id: &str, assigned: &BTreeSet<String>) -> bool {
    candidate_id == author_id || assigned.contains(candidate_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_conflicts() {
        let assigned = BTreeSet::new();
        assert!(is_conflict("alice", "alice", &assigned));
        assert!(!is_conflict("bob", "alice", &assigned));
    }

    #[test]
    fn test_existing_reviewer_conflicts() {
        let assigned: BTreeSet<String> = ["bob".to_string(), "carol".to_string()].into();
        assert!(is_conflict("carol", "alice", &assigned));
        assert!(!is_conflict("dave", "alice", &assigned));
    }
}
