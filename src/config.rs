use serde::{Deserialize, Serialize};

/// Static per-run configuration for the archive and the evolution loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Nearest-neighbor distance below which a novelty cell counts as occupied
    pub novelty_threshold: f64,
    /// k for the mean-distance novelty score
    pub novelty_neighbors: usize,
    /// Archive admits unconditionally while its size is at or below this
    pub min_archive_size: usize,
    /// Floor on the number of offspring produced each generation
    pub min_reproduce: usize,
    /// Population size the reproduction quota aims to restore
    pub target_population_size: usize,
    /// Probability of applying the add-node mutation to an offspring
    pub mutate_add_node_rate: f64,
    /// Probability of applying the add-link mutation to an offspring
    pub mutate_add_link_rate: f64,
    /// Probability of applying the link-weight mutation to an offspring
    pub mutate_link_weight_rate: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            novelty_threshold: 3.0,
            novelty_neighbors: 15,
            min_archive_size: 10,
            min_reproduce: 10,
            target_population_size: 150,
            mutate_add_node_rate: 0.15,
            mutate_add_link_rate: 0.30,
            mutate_link_weight_rate: 0.80,
        }
    }
}
