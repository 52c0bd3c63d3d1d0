//! Reviewer Assignment Engine
//!
//! Decides who reviews what: initial assignment on pull request creation,
//! single reviewer replacement, and atomic bulk deactivation with
//! coverage-preserving replacement.

pub mod bulk;
pub mod candidates;
pub mod policy;
pub mod reassign;
pub mod stats;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub use bulk::{deactivate_and_reassign, plan_replacements, Replacement};
pub use candidates::{eligible_reviewers, is_conflict};
pub use policy::{choose_initial_reviewers, first_fit, pick_random};
pub use reassign::reassign_reviewer;
pub use stats::assignment_counts;

/// Reviewers drawn for every newly created pull request.
pub const REVIEWERS_PER_PULL_REQUEST: usize = 2;

/// Where random draws come from. Each operation gets its own generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomSource {
    #[default]
    Entropy,
    Seeded(u64),
}

impl RandomSource {
    pub fn rng(&self) -> StdRng {
        match self {
            RandomSource::Entropy => StdRng::from_entropy(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}
