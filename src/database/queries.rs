use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::collections::{BTreeMap, BTreeSet};

use crate::database::models::*;

/// Storage primitives. Every function takes a bare connection so the same
/// statement runs against a pooled connection or inside a transaction.
pub struct Queries;

impl Queries {
    pub async fn team_exists(
        conn: &mut SqliteConnection,
        team_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?)")
            .bind(team_name)
            .fetch_one(&mut *conn)
            .await?;
        Ok(found != 0)
    }

    pub async fn insert_team(
        conn: &mut SqliteConnection,
        team_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(team_name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Insert a member, or move an existing user into `team_name` and
    /// overwrite its name and active flag.
    pub async fn upsert_member(
        conn: &mut SqliteConnection,
        team_name: &str,
        member: &TeamMember,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                username = excluded.username,
                team_name = excluded.team_name,
                is_active = excluded.is_active
            "#,
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(team_name)
        .bind(member.is_active)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn get_team(
        conn: &mut SqliteConnection,
        team_name: &str,
    ) -> Result<Option<Team>, sqlx::Error> {
        if !Self::team_exists(conn, team_name).await? {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *conn)
        .await?;

        let members = rows
            .iter()
            .map(|row| {
                Ok(TeamMember {
                    user_id: row.try_get("user_id")?,
                    username: row.try_get("username")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    pub async fn get_user(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn set_user_active(
        conn: &mut SqliteConnection,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET is_active = ?
            WHERE user_id = ?
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn list_active_team_members_except(
        conn: &mut SqliteConnection,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ? AND is_active = TRUE AND user_id <> ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(exclude_user_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    pub async fn list_active_team_member_ids(
        conn: &mut SqliteConnection,
        team_name: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM users
            WHERE team_name = ? AND is_active = TRUE
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *conn)
        .await
    }

    /// Members of `team_name` among `user_ids`, regardless of active flag.
    pub async fn list_team_member_ids_in(
        conn: &mut SqliteConnection,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT user_id FROM users WHERE team_name = ");
        builder.push_bind(team_name);
        builder.push(" AND user_id IN ");
        push_id_list(&mut builder, user_ids);
        builder.push(" ORDER BY user_id");

        builder
            .build_query_scalar::<String>()
            .fetch_all(&mut *conn)
            .await
    }

    /// Flip active members of `team_name` listed in `user_ids` to inactive,
    /// returning how many rows actually changed.
    pub async fn deactivate_team_users(
        conn: &mut SqliteConnection,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<u64, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "UPDATE users SET is_active = FALSE WHERE is_active = TRUE AND team_name = ",
        );
        builder.push_bind(team_name);
        builder.push(" AND user_id IN ");
        push_id_list(&mut builder, user_ids);

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn pull_request_exists(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = ?)",
        )
        .bind(pull_request_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(found != 0)
    }

    pub async fn insert_pull_request(
        conn: &mut SqliteConnection,
        pr: &NewPullRequest,
        created_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(PullRequestStatus::Open.as_str())
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn insert_reviewer(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
        reviewer_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id) VALUES (?, ?)")
            .bind(pull_request_id)
            .bind(reviewer_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn get_pull_request(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
    ) -> Result<Option<PullRequest>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers = Self::list_reviewers(conn, pull_request_id).await?;
        pull_request_from_row(&row, reviewers).map(Some)
    }

    pub async fn list_reviewers(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT reviewer_id
            FROM pull_request_reviewers
            WHERE pull_request_id = ?
            ORDER BY reviewer_id
            "#,
        )
        .bind(pull_request_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Set MERGED; `merged_at` is only written the first time.
    pub async fn mark_merged(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PullRequest>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = ?,
                merged_at = COALESCE(merged_at, ?)
            WHERE pull_request_id = ?
            RETURNING pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            "#,
        )
        .bind(PullRequestStatus::Merged.as_str())
        .bind(now)
        .bind(pull_request_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers = Self::list_reviewers(conn, pull_request_id).await?;
        pull_request_from_row(&row, reviewers).map(Some)
    }

    /// Swap one reviewer row. Returns the number of rows matched (0 or 1).
    pub async fn replace_reviewer(
        conn: &mut SqliteConnection,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE pull_request_reviewers
            SET reviewer_id = ?
            WHERE pull_request_id = ? AND reviewer_id = ?
            "#,
        )
        .bind(new_reviewer_id)
        .bind(pull_request_id)
        .bind(old_reviewer_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_pull_requests_by_reviewer(
        conn: &mut SqliteConnection,
        reviewer_id: &str,
    ) -> Result<Vec<PullRequestShort>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            JOIN pull_request_reviewers r ON r.pull_request_id = p.pull_request_id
            WHERE r.reviewer_id = ?
            ORDER BY p.created_at DESC, p.pull_request_id
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PullRequestShort {
                    pull_request_id: row.try_get("pull_request_id")?,
                    pull_request_name: row.try_get("pull_request_name")?,
                    author_id: row.try_get("author_id")?,
                    status: status_from_row(row)?,
                })
            })
            .collect()
    }

    /// Open pull requests reviewed by any of `reviewer_ids`, ordered by
    /// pull request id then reviewer id.
    pub async fn list_open_assignments_for_reviewers(
        conn: &mut SqliteConnection,
        reviewer_ids: &[String],
    ) -> Result<Vec<OpenAssignment>, sqlx::Error> {
        if reviewer_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT p.pull_request_id, p.author_id, r.reviewer_id
            FROM pull_request_reviewers r
            JOIN pull_requests p ON p.pull_request_id = r.pull_request_id
            WHERE p.status = "#,
        );
        builder.push_bind(PullRequestStatus::Open.as_str());
        builder.push(" AND r.reviewer_id IN ");
        push_id_list(&mut builder, reviewer_ids);
        builder.push(" ORDER BY p.pull_request_id, r.reviewer_id");

        let rows = builder.build().fetch_all(&mut *conn).await?;
        rows.iter()
            .map(|row| {
                Ok(OpenAssignment {
                    pull_request_id: row.try_get("pull_request_id")?,
                    author_id: row.try_get("author_id")?,
                    reviewer_id: row.try_get("reviewer_id")?,
                })
            })
            .collect()
    }

    /// Full reviewer set for each requested pull request; requested ids
    /// without reviewers map to an empty set.
    pub async fn list_reviewers_for_pull_requests(
        conn: &mut SqliteConnection,
        pull_request_ids: &[String],
    ) -> Result<BTreeMap<String, BTreeSet<String>>, sqlx::Error> {
        let mut reviewers: BTreeMap<String, BTreeSet<String>> = pull_request_ids
            .iter()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();
        if pull_request_ids.is_empty() {
            return Ok(reviewers);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT pull_request_id, reviewer_id FROM pull_request_reviewers WHERE pull_request_id IN ",
        );
        push_id_list(&mut builder, pull_request_ids);

        let rows = builder.build().fetch_all(&mut *conn).await?;
        for row in rows {
            let pull_request_id: String = row.try_get("pull_request_id")?;
            let reviewer_id: String = row.try_get("reviewer_id")?;
            reviewers.entry(pull_request_id).or_default().insert(reviewer_id);
        }
        Ok(reviewers)
    }

    pub async fn assignment_counts(
        conn: &mut SqliteConnection,
    ) -> Result<Vec<ReviewerAssignmentStat>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT reviewer_id AS user_id, COUNT(*) AS assignments
            FROM pull_request_reviewers
            GROUP BY reviewer_id
            ORDER BY reviewer_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ReviewerAssignmentStat {
                    user_id: row.try_get("user_id")?,
                    assignments: row.try_get("assignments")?,
                })
            })
            .collect()
    }
}

fn push_id_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, ids: &'args [String]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        team_name: row.try_get("team_name")?,
        is_active: row.try_get("is_active")?,
    })
}

fn status_from_row(row: &SqliteRow) -> Result<PullRequestStatus, sqlx::Error> {
    let raw: String = row.try_get("status")?;
    PullRequestStatus::from_str(&raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown pull request status: {}", raw).into()))
}

fn pull_request_from_row(
    row: &SqliteRow,
    assigned_reviewers: Vec<String>,
) -> Result<PullRequest, sqlx::Error> {
    Ok(PullRequest {
        pull_request_id: row.try_get("pull_request_id")?,
        pull_request_name: row.try_get("pull_request_name")?,
        author_id: row.try_get("author_id")?,
        status: status_from_row(row)?,
        assigned_reviewers,
        created_at: row.try_get("created_at")?,
        merged_at: row.try_get("merged_at")?,
    })
}
