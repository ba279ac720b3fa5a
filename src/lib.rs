pub mod chart;
pub mod config;
pub mod demo;
pub mod explorer;
pub mod html;
pub mod logging;
pub mod pipeline;
pub mod sample;
pub mod state;

use rand::{rngs::StdRng, SeedableRng};

/// Seeded when `seed` is set, entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
