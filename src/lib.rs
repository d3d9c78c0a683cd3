//! Quality-diversity evolution core.
//!
//! Curates a behaviorally diverse, high-performing population by combining a
//! behavioral-novelty archive with fitness-proportionate reproduction. Each
//! generation the external environment evaluates the population (one fitness
//! scalar and one behavioral descriptor per organism), the
//! [`NoveltyArchive`] decides which organisms represent a distinct skill and
//! survive, and [`Population::evolve`] refills the population with offspring
//! bred from fitness-weighted parents.
//!
//! Genome encoding, mutation, crossover, and the evaluation environment are
//! external collaborators behind the [`GenomeOps`] capability trait; this
//! crate passes only fitness scalars, descriptors, and organism identities
//! across that boundary.

pub mod archive;
pub mod config;
pub mod error;
pub mod genome;
pub mod organism;
pub mod population;

pub use archive::{ArchiveEntry, NoveltyArchive};
pub use config::EvolutionConfig;
pub use error::EvolutionError;
pub use genome::GenomeOps;
pub use organism::{Descriptor, Organism};
pub use population::{Checkpoint, GenerationStats, Population};
