use rand::Rng;
use sqlx::SqliteConnection;
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::candidates::{eligible_reviewers, is_conflict};
use super::policy::pick_random;
use crate::database::models::{PullRequestStatus, Reassignment, User};
use crate::database::queries::Queries;
use crate::error::ServiceError;

/// Replace `old_reviewer_id` on `pull_request_id` with a random eligible
/// teammate of the old reviewer.
///
/// The connection must be inside a transaction: the precondition checks and
/// the row swap are only linearized when they share one.
pub async fn reassign_reviewer<R: Rng + Send>(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    rng: &mut R,
) -> Result<Reassignment, ServiceError> {
    let pr = Queries::get_pull_request(conn, pull_request_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if pr.status == PullRequestStatus::Merged {
        debug!(pull_request_id, "reassignment rejected: pull request merged");
        return Err(ServiceError::PullRequestMerged);
    }

    let assigned: BTreeSet<String> = pr.assigned_reviewers.iter().cloned().collect();
    if !assigned.contains(old_reviewer_id) {
        debug!(pull_request_id, old_reviewer_id, "reassignment rejected: not assigned");
        return Err(ServiceError::NotAssigned);
    }

    let old_reviewer = Queries::get_user(conn, old_reviewer_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let pool = eligible_reviewers(conn, &old_reviewer.team_name, old_reviewer_id).await?;
    let filtered: Vec<&User> = pool
        .iter()
        .filter(|candidate| !is_conflict(&candidate.user_id, &pr.author_id, &assigned))
        .collect();

    let new_reviewer_id = pick_random(&filtered, rng)
        .map(|user| user.user_id.clone())
        .ok_or(ServiceError::NoCandidate)?;

    let replaced =
        Queries::replace_reviewer(conn, pull_request_id, old_reviewer_id, &new_reviewer_id).await?;
    if replaced == 0 {
        return Err(ServiceError::assignment_vanished(pull_request_id, old_reviewer_id));
    }

    let updated = Queries::get_pull_request(conn, pull_request_id)
        .await?
        .ok_or_else(|| {
            ServiceError::Internal(format!("pull request {} vanished mid-reassignment", pull_request_id))
        })?;

    info!(
        pull_request_id,
        old_reviewer_id,
        new_reviewer_id = %new_reviewer_id,
        "reviewer reassigned"
    );

    Ok(Reassignment {
        pr: updated,
        replaced_by: new_reviewer_id,
    })
}
