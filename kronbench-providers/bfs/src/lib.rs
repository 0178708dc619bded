//! Reference traversal kernel and tree verifier for the kronbench pipeline.

mod csr;
mod kernel;
mod verifier;

pub use csr::Csr;
pub use kernel::LevelSyncBfs;
pub use verifier::ParentTreeVerifier;
