use serde::{Deserialize, Serialize};

/// Fixed-length numeric summary of one organism's observed behavior.
///
/// Dimensionality is fixed for a run and established by the first descriptor
/// the archive sees.
pub type Descriptor = Vec<f64>;

/// A candidate solution: an exclusively owned genome plus fitness bookkeeping.
///
/// Ids are assigned by the controller, increase monotonically, and are never
/// reused. The genome type is opaque to this crate; all genome operations go
/// through [`GenomeOps`](crate::GenomeOps).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organism<G> {
    /// Unique, monotonically increasing id
    pub id: u64,
    /// The evolvable structure, exclusively owned
    pub genome: G,
    /// Generation this organism was created in
    pub generation: u32,
    /// Number of generations survived
    pub age: u32,
    /// Raw average fitness written by the external evaluation environment
    pub avg_fitness: f64,
    /// Fitness normalized to [0, 1] over the current survivor set
    pub adj_fitness: f64,
}

impl<G> Organism<G> {
    /// Create an organism with zeroed fitness bookkeeping.
    pub fn new(id: u64, genome: G, generation: u32) -> Self {
        Self {
            id,
            genome,
            generation,
            age: 0,
            avg_fitness: 0.0,
            adj_fitness: 0.0,
        }
    }
}
