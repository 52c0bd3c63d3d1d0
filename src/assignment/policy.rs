//! Selection rules: random draws for creation and single reassignment,
//! deterministic first fit for bulk replacement.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use super::candidates::is_conflict;
use crate::database::models::User;

/// Up to `limit` distinct reviewers, uniformly at random without
/// replacement. Short pools are taken whole; an empty pool yields nothing.
pub fn choose_initial_reviewers<R: Rng + ?Sized>(
    candidates: &[User],
    limit: usize,
    rng: &mut R,
) -> Vec<String> {
    if limit == 0 || candidates.is_empty() {
        return Vec::new();
    }

    if candidates.len() <= limit {
        return candidates.iter().map(|u| u.user_id.clone()).collect();
    }

    candidates
        .choose_multiple(rng, limit)
        .map(|u| u.user_id.clone())
        .collect()
}

pub fn pick_random<'a, R: Rng + ?Sized>(candidates: &[&'a User], rng: &mut R) -> Option<&'a User> {
    candidates.choose(rng).copied()
}

/// First pool member that is neither the author nor already assigned.
pub fn first_fit<'a>(
    pool: &'a [String],
    author_id: &str,
    assigned: &BTreeSet<String>,
) -> Option<&'a str> {
    pool.iter()
        .map(String::as_str)
        .find(|candidate| !is_conflict(candidate, author_id, assigned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn users(ids: &[&str]) -> Vec<User> {
        ids.iter()
            .map(|id| User {
                user_id: id.to_string(),
                username: id.to_uppercase(),
                team_name: "backend".to_string(),
                is_active: true,
            })
            .collect()
    }

    #[test]
    fn test_zero_limit_or_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(choose_initial_reviewers(&users(&["a", "b"]), 0, &mut rng).is_empty());
        assert!(choose_initial_reviewers(&[], 2, &mut rng).is_empty());
    }

    #[test]
    fn test_short_pool_is_taken_whole() {
        let mut rng = StdRng::seed_from_u64(7);
        let chosen = choose_initial_reviewers(&users(&["a"]), 2, &mut rng);
        assert_eq!(chosen, vec!["a".to_string()]);

        let chosen = choose_initial_reviewers(&users(&["a", "b"]), 2, &mut rng);
        assert_eq!(chosen, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_large_pool_draws_distinct_members() {
        let pool = users(&["a", "b", "c", "d", "e"]);
        let mut seen = BTreeSet::new();

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = choose_initial_reviewers(&pool, 2, &mut rng);
            assert_eq!(chosen.len(), 2);
            assert_ne!(chosen[0], chosen[1]);
            for id in &chosen {
                assert!(pool.iter().any(|u| &u.user_id == id));
                seen.insert(id.clone());
            }
        }

        // every member is reachable
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_pick_random_stays_in_pool() {
        let pool = users(&["x", "y", "z"]);
        let refs: Vec<&User> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..16 {
            let picked = pick_random(&refs, &mut rng).unwrap();
            assert!(["x", "y", "z"].contains(&picked.user_id.as_str()));
        }
        assert!(pick_random(&[], &mut rng).is_none());
    }

    #[test]
    fn test_first_fit_skips_author_and_assigned() {
        let pool: Vec<String> = ["author", "r2", "r3"].iter().map(|s| s.to_string()).collect();
        let assigned: BTreeSet<String> = ["r1".to_string(), "r2".to_string()].into();

        assert_eq!(first_fit(&pool, "author", &assigned), Some("r3"));

        let assigned: BTreeSet<String> = ["r2".to_string(), "r3".to_string()].into();
        assert_eq!(first_fit(&pool, "author", &assigned), None);
    }
}
