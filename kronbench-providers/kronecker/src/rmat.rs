//! Unscrambled recursive-matrix generator.

use kronbench_core::{Edge, GeneratorError, RmatGenerator, RmatParams};
use tracing::instrument;

use crate::placement::{Initiator, check_scale, splitmix64};

/// Recursive-matrix generator with a fixed seed.
///
/// Unlike [`crate::KroneckerGenerator`] the vertex ids keep their recursive
/// structure: low ids are the hubs.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, RmatGenerator, RmatParams};
/// use kronbench_providers_kronecker::SeededRmat;
///
/// let mut edges = vec![Edge::default(); 100];
/// SeededRmat::new(7).fill(&mut edges, 5, RmatParams::default())?;
/// assert!(edges.iter().all(|edge| edge.v0 < 32 && edge.v1 < 32));
/// # Ok::<(), kronbench_core::GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SeededRmat {
    seed: u64,
}

impl SeededRmat {
    /// Creates a generator drawing from `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RmatGenerator for SeededRmat {
    #[instrument(name = "rmat.fill", err, skip(self, edges), fields(edges = edges.len()))]
    fn fill(
        &mut self,
        edges: &mut [Edge],
        scale: u32,
        params: RmatParams,
    ) -> Result<(), GeneratorError> {
        check_scale(scale)?;
        if params.d() < -1e-12 {
            return Err(GeneratorError::InvalidParameter { parameter: "D" });
        }
        Initiator::new(params).fill(edges, scale, splitmix64(self.seed));
        Ok(())
    }
}
