//! Reference edge generators for the kronbench pipeline.
//!
//! [`KroneckerGenerator`] produces the classic scrambled Kronecker graph and
//! [`SeededRmat`] fills caller buffers with unscrambled recursive-matrix
//! edges. Both split the work into fixed-size chunks with their own seeds, so
//! the output depends only on the seeds and never on the thread count.

mod kronecker;
mod placement;
mod rmat;

pub use kronecker::KroneckerGenerator;
pub use rmat::SeededRmat;
