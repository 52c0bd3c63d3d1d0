//! Bulk Deactivation
//!
//! Deactivates a batch of team members and moves every open review they
//! hold onto the remaining active members, all in the caller's transaction.
//! Replacements are chosen by deterministic first fit so a batch touching
//! many pull requests over one small pool is reproducible.

use sqlx::SqliteConnection;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::policy::first_fit;
use crate::database::models::{BulkDeactivateResult, OpenAssignment};
use crate::database::queries::Queries;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
    pub new_reviewer_id: String,
}

/// Choose a replacement for every work item in order.
///
/// `reviewers` holds the full reviewer set of each affected pull request and
/// is updated as choices are made, so later items never duplicate an earlier
/// pick. Any item without a candidate fails the whole plan.
pub fn plan_replacements(
    work: &[OpenAssignment],
    pool: &[String],
    reviewers: &mut BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<Replacement>, ServiceError> {
    let mut plan = Vec::with_capacity(work.len());

    for item in work {
        let assigned = reviewers.entry(item.pull_request_id.clone()).or_default();
        let chosen = match first_fit(pool, &item.author_id, assigned) {
            Some(candidate) => candidate.to_string(),
            None => {
                debug!(
                    pull_request_id = %item.pull_request_id,
                    reviewer_id = %item.reviewer_id,
                    "no replacement candidate"
                );
                return Err(ServiceError::NoCandidate);
            }
        };

        assigned.insert(chosen.clone());
        plan.push(Replacement {
            pull_request_id: item.pull_request_id.clone(),
            old_reviewer_id: item.reviewer_id.clone(),
            new_reviewer_id: chosen,
        });
    }

    Ok(plan)
}

/// Must run inside a transaction; any error leaves the caller to roll back
/// deactivations and replacements together.
pub async fn deactivate_and_reassign(
    conn: &mut SqliteConnection,
    team_name: &str,
    user_ids: &[String],
) -> Result<BulkDeactivateResult, ServiceError> {
    let mut result = BulkDeactivateResult {
        team_name: team_name.to_string(),
        deactivated_count: 0,
        reassigned_count: 0,
    };

    if !Queries::team_exists(conn, team_name).await? {
        return Err(ServiceError::NotFound);
    }

    let requested: Vec<String> = user_ids
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if requested.is_empty() {
        return Ok(result);
    }

    result.deactivated_count = Queries::deactivate_team_users(conn, team_name, &requested).await?;

    let members = Queries::list_team_member_ids_in(conn, team_name, &requested).await?;
    let pool = Queries::list_active_team_member_ids(conn, team_name).await?;
    let work = Queries::list_open_assignments_for_reviewers(conn, &members).await?;

    if work.is_empty() {
        info!(team_name, deactivated = result.deactivated_count, "bulk deactivation applied, nothing to reassign");
        return Ok(result);
    }
    if pool.is_empty() {
        debug!(team_name, pending = work.len(), "no active members left to take over reviews");
        return Err(ServiceError::NoCandidate);
    }

    let pull_request_ids: Vec<String> = work
        .iter()
        .map(|item| item.pull_request_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut reviewers = Queries::list_reviewers_for_pull_requests(conn, &pull_request_ids).await?;

    let plan = plan_replacements(&work, &pool, &mut reviewers)?;

    for replacement in &plan {
        let replaced = Queries::replace_reviewer(
            conn,
            &replacement.pull_request_id,
            &replacement.old_reviewer_id,
            &replacement.new_reviewer_id,
        )
        .await?;
        if replaced == 0 {
            return Err(ServiceError::assignment_vanished(
                &replacement.pull_request_id,
                &replacement.old_reviewer_id,
            ));
        }
        result.reassigned_count += replaced;
    }

    info!(
        team_name,
        deactivated = result.deactivated_count,
        reassigned = result.reassigned_count,
        pull_requests = pull_request_ids.len(),
        "bulk deactivation applied"
    );

    Ok(result)
}
