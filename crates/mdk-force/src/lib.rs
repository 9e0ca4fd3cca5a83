//! Pairwise interactions for the mdk molecular dynamics engine.
//!
//! Potential kernels are selected by a serializable tag per type pair and
//! dispatched through precomputed parameter blocks; the engine runs an
//! O(N²) loop over unordered pairs with minimum-image distances and
//! analytic long-range tail corrections.

pub mod engine;
pub mod pair;

pub use engine::compute_interactions;
pub use pair::{lj_tail_integral, unit_sphere_surface, PairKernel, PairParams, PairTable};
