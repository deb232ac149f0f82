//! Volumetric-lattice ingestion: raw sample container and the normalizer
//! that turns it into a fit-ready grid.

mod lattice;
mod normalize;

pub use lattice::RawLattice;
pub use normalize::{FilterStats, normalize_lattice};
