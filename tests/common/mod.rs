#![allow(dead_code)]

use reviewer_service::assignment::RandomSource;
use reviewer_service::database::models::*;
use reviewer_service::database::queries::Queries;
use reviewer_service::database::Database;
use reviewer_service::ReviewService;

/// Service over a fresh in-memory SQLite database with a fixed seed
pub async fn setup_test_service() -> ReviewService {
    setup_seeded_service(42).await
}

pub async fn setup_seeded_service(seed: u64) -> ReviewService {
    let database = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    ReviewService::new(database, RandomSource::Seeded(seed))
}

pub fn member(user_id: &str, is_active: bool) -> TeamMember {
    TeamMember {
        user_id: user_id.to_string(),
        username: format!("User {}", user_id),
        is_active,
    }
}

pub fn team(team_name: &str, members: &[(&str, bool)]) -> Team {
    Team {
        team_name: team_name.to_string(),
        members: members.iter().map(|(id, active)| member(id, *active)).collect(),
    }
}

pub async fn create_team(service: &ReviewService, team_name: &str, members: &[(&str, bool)]) -> Team {
    service
        .create_team(team(team_name, members))
        .await
        .expect("Failed to create team")
}

pub fn new_pull_request(pull_request_id: &str, author_id: &str) -> NewPullRequest {
    NewPullRequest {
        pull_request_id: pull_request_id.to_string(),
        pull_request_name: format!("Change {}", pull_request_id),
        author_id: author_id.to_string(),
    }
}

/// Insert an open pull request with exactly `reviewers`, bypassing random
/// assignment so scenarios are deterministic.
pub async fn seed_pull_request(
    service: &ReviewService,
    pull_request_id: &str,
    author_id: &str,
    reviewers: &[&str],
) {
    let mut conn = service
        .database()
        .pool()
        .acquire()
        .await
        .expect("Failed to acquire connection");

    Queries::insert_pull_request(
        &mut conn,
        &new_pull_request(pull_request_id, author_id),
        chrono::Utc::now(),
    )
    .await
    .expect("Failed to insert pull request");

    for reviewer_id in reviewers {
        Queries::insert_reviewer(&mut conn, pull_request_id, reviewer_id)
            .await
            .expect("Failed to insert reviewer");
    }
}

pub async fn reviewers_of(service: &ReviewService, pull_request_id: &str) -> Vec<String> {
    let mut conn = service
        .database()
        .pool()
        .acquire()
        .await
        .expect("Failed to acquire connection");

    Queries::list_reviewers(&mut conn, pull_request_id)
        .await
        .expect("Failed to list reviewers")
}

pub async fn is_active(service: &ReviewService, user_id: &str) -> bool {
    let mut conn = service
        .database()
        .pool()
        .acquire()
        .await
        .expect("Failed to acquire connection");

    Queries::get_user(&mut conn, user_id)
        .await
        .expect("Failed to load user")
        .expect("User missing")
        .is_active
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Make every UPDATE on reviewer rows a silent no-op, as if the row had been
/// removed by a concurrent writer between check and write.
pub async fn freeze_reviewer_rows(service: &ReviewService) {
    sqlx::query(
        r#"
        CREATE TRIGGER freeze_reviewer_rows
        BEFORE UPDATE ON pull_request_reviewers
        BEGIN
            SELECT RAISE(IGNORE);
        END
        "#,
    )
    .execute(service.database().pool())
    .await
    .expect("Failed to install trigger");
}
