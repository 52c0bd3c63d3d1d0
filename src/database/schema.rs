// Database schema definitions
// Applied in order by `Database::run_migrations`

pub const INITIAL_SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[("001_initial_schema", INITIAL_SCHEMA)];
