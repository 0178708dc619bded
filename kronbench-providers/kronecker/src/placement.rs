//! Seed derivation and recursive quadrant placement shared by the generators.

use kronbench_core::{Edge, GeneratorError, RmatParams};
use rand::{Rng, SeedableRng, distributions::Standard, rngs::SmallRng};
use rayon::prelude::*;

/// Edges generated from one derived seed.
pub(crate) const CHUNK_EDGES: usize = 1 << 12;

/// Largest scale whose vertex ids fit in a `u64` with room for a sentinel.
pub(crate) const MAX_SCALE: u32 = 63;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_A: u64 = 0xBF58_476D_1CE4_E5B9;
const MIX_B: u64 = 0x94D0_49BB_1331_11EB;

/// SplitMix64 finaliser.
pub(crate) fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(GOLDEN_GAMMA);
    state = (state ^ (state >> 30)).wrapping_mul(MIX_A);
    state = (state ^ (state >> 27)).wrapping_mul(MIX_B);
    state ^ (state >> 31)
}

/// Derives an independent stream seed from `base` and a stream index.
pub(crate) fn stream_seed(base: u64, stream: u64) -> u64 {
    splitmix64(base ^ stream.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA))
}

pub(crate) fn check_scale(scale: u32) -> Result<(), GeneratorError> {
    if scale == 0 || scale > MAX_SCALE {
        return Err(GeneratorError::InvalidParameter { parameter: "scale" });
    }
    Ok(())
}

/// Quadrant thresholds precomputed from the initiator probabilities.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Initiator {
    /// Probability of landing in the top half (`A + B`).
    top: f64,
    /// Probability of the left column within the top half.
    left_given_top: f64,
    /// Probability of the left column within the bottom half.
    left_given_bottom: f64,
}

impl Initiator {
    pub(crate) fn new(params: RmatParams) -> Self {
        let top = params.a + params.b;
        let bottom = params.c + params.d();
        let ratio = |part: f64, whole: f64| if whole > 0.0 { part / whole } else { 0.0 };
        Self {
            top,
            left_given_top: ratio(params.a, top),
            left_given_bottom: ratio(params.c, bottom),
        }
    }

    /// Descends `scale` levels, picking one quadrant per level.
    pub(crate) fn place(&self, rng: &mut SmallRng, scale: u32) -> Edge {
        let mut row = 0_u64;
        let mut col = 0_u64;
        for _ in 0..scale {
            let lower = rng.sample::<f64, _>(Standard) >= self.top;
            let left = if lower {
                self.left_given_bottom
            } else {
                self.left_given_top
            };
            let right = rng.sample::<f64, _>(Standard) >= left;
            row = (row << 1) | u64::from(lower);
            col = (col << 1) | u64::from(right);
        }
        Edge::new(row, col)
    }

    /// Overwrites `edges` in parallel, one derived seed per chunk.
    pub(crate) fn fill(&self, edges: &mut [Edge], scale: u32, base_seed: u64) {
        edges
            .par_chunks_mut(CHUNK_EDGES)
            .enumerate()
            .for_each(|(chunk, slots)| {
                let mut rng = SmallRng::seed_from_u64(stream_seed(base_seed, chunk as u64));
                for slot in slots {
                    *slot = self.place(&mut rng, scale);
                }
            });
    }
}
