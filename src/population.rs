use crate::archive::{ArchiveEntry, NoveltyArchive};
use crate::config::EvolutionConfig;
use crate::error::EvolutionError;
use crate::genome::GenomeOps;
use crate::organism::{Descriptor, Organism};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Statistics for a completed generation
#[derive(Clone, Debug)]
pub struct GenerationStats {
    pub generation: u32,
    pub survivors: usize,
    pub offspring: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen {:>4} | Survivors: {:>4} | Offspring: {:>4} | Best: {:>8.3} | Avg: {:>8.3}",
            self.generation, self.survivors, self.offspring, self.best_fitness, self.avg_fitness,
        )
    }
}

/// Serializable snapshot of a run, for resuming between sessions.
#[derive(Serialize, Deserialize)]
pub struct Checkpoint<G> {
    pub generation: u32,
    pub next_id: u64,
    pub organisms: Vec<Organism<G>>,
    pub archive: Vec<ArchiveEntry>,
}

impl<G> Checkpoint<G> {
    /// Write the snapshot as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EvolutionError>
    where
        G: Serialize,
    {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot previously written by [`Checkpoint::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EvolutionError>
    where
        G: DeserializeOwned,
    {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// The evolution controller: owns the working population and the novelty
/// archive, and drives one generation transition per [`evolve`] call.
///
/// Evaluation happens outside: between calls the external environment writes
/// `avg_fitness` into each organism (via [`organisms_mut`]) and produces one
/// behavioral descriptor per organism, in population order.
///
/// [`evolve`]: Population::evolve
/// [`organisms_mut`]: Population::organisms_mut
pub struct Population<O: GenomeOps> {
    config: EvolutionConfig,
    ops: O,
    organisms: Vec<Organism<O::Genome>>,
    archive: NoveltyArchive,
    generation: u32,
    next_id: u64,
}

impl<O: GenomeOps> Population<O> {
    pub fn new(config: EvolutionConfig, ops: O) -> Self {
        let archive = NoveltyArchive::new(&config);
        Self {
            config,
            ops,
            organisms: Vec::new(),
            archive,
            generation: 0,
            next_id: 1,
        }
    }

    /// Restore a controller from a saved snapshot.
    pub fn from_checkpoint(checkpoint: Checkpoint<O::Genome>, config: EvolutionConfig, ops: O) -> Self {
        let archive = NoveltyArchive::restore(&config, checkpoint.archive);
        Self {
            config,
            ops,
            organisms: checkpoint.organisms,
            archive,
            generation: checkpoint.generation,
            next_id: checkpoint.next_id,
        }
    }

    /// Snapshot the current run state.
    pub fn checkpoint(&self) -> Checkpoint<O::Genome> {
        Checkpoint {
            generation: self.generation,
            next_id: self.next_id,
            organisms: self
                .organisms
                .iter()
                .map(|o| Organism {
                    id: o.id,
                    genome: self.ops.clone_genome(&o.genome),
                    generation: o.generation,
                    age: o.age,
                    avg_fitness: o.avg_fitness,
                    adj_fitness: o.adj_fitness,
                })
                .collect(),
            archive: self.archive.entries().to_vec(),
        }
    }

    /// Spawn the initial population from a base genome.
    ///
    /// Each spawned organism gets an explicit copy of the base with every
    /// link weight drawn fresh (`randomize_all`), rather than perturbed.
    pub fn spawn(&mut self, base_genome: &O::Genome, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let mut genome = self.ops.clone_genome(base_genome);
            self.ops.mutate_link_weights(&mut genome, true, rng);
            let organism = Organism::new(self.next_id, genome, self.generation);
            self.next_id += 1;
            self.organisms.push(organism);
        }
        tracing::info!(count, "spawned initial population");
    }

    /// Run one generation transition.
    ///
    /// `descriptors` must parallel the current population: one descriptor per
    /// organism, same order. Candidates are fed to the archive in
    /// fitness-descending order (higher fitness gets first claim on contested
    /// novelty cells), survivors are the archive's organism set, and the
    /// reproduction quota is filled by fitness-proportionate sampling with
    /// replacement.
    pub fn evolve(
        &mut self,
        descriptors: &[Descriptor],
        rng: &mut impl Rng,
    ) -> Result<GenerationStats, EvolutionError> {
        if descriptors.len() != self.organisms.len() {
            return Err(EvolutionError::ArityMismatch {
                generation: self.generation,
                organisms: self.organisms.len(),
                descriptors: descriptors.len(),
            });
        }
        // Validate descriptor shapes up front so a mismatch aborts before any
        // state changes.
        let expected = self
            .archive
            .descriptor_len()
            .or_else(|| descriptors.first().map(Vec::len));
        if let Some(expected) = expected {
            for d in descriptors {
                if d.len() != expected {
                    return Err(EvolutionError::DescriptorShapeMismatch {
                        expected,
                        got: d.len(),
                    });
                }
            }
        }

        self.generation += 1;
        // Entries carry fitness snapshots; bring them up to date with the
        // just-completed evaluation before any eviction comparison runs.
        self.archive.update_fitness(&self.organisms);

        let mut pairs: Vec<(Organism<O::Genome>, &Descriptor)> =
            self.organisms.drain(..).zip(descriptors).collect();
        // Stable sort keeps input order among equal fitness.
        pairs.sort_by(|a, b| b.0.avg_fitness.total_cmp(&a.0.avg_fitness));

        for (organism, descriptor) in &pairs {
            self.archive.attempt_add(organism, descriptor)?;
        }

        // The curated survivor set, in archive order.
        let mut by_id: HashMap<u64, Organism<O::Genome>> =
            pairs.into_iter().map(|(o, _)| (o.id, o)).collect();
        let mut survivors: Vec<Organism<O::Genome>> = self
            .archive
            .organism_ids()
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect();

        if survivors.is_empty() {
            return Err(EvolutionError::EmptySurvivorSet {
                generation: self.generation,
            });
        }

        let quota = self
            .config
            .target_population_size
            .saturating_sub(survivors.len())
            .max(self.config.min_reproduce);

        let weights = shape_fitness(&mut survivors, self.generation)?;
        let sampler = WeightedIndex::new(&weights).map_err(|_| EvolutionError::DegenerateFitness {
            generation: self.generation,
            survivors: survivors.len(),
        })?;

        let mut offspring = Vec::with_capacity(quota);
        for _ in 0..quota {
            // Two independent draws; self-pairing is allowed.
            let parent_a = &survivors[sampler.sample(rng)];
            let parent_b = &survivors[sampler.sample(rng)];

            let mut child = self.ops.reproduce_directional(
                &parent_a.genome,
                &parent_b.genome,
                parent_a.avg_fitness,
                parent_b.avg_fitness,
                rng,
            );

            // The three mutations are independent, not mutually exclusive.
            if rng.gen::<f64>() < self.config.mutate_add_node_rate {
                self.ops.mutate_add_node(&mut child, rng);
            }
            if rng.gen::<f64>() < self.config.mutate_add_link_rate {
                self.ops.mutate_add_link(&mut child, rng);
            }
            if rng.gen::<f64>() < self.config.mutate_link_weight_rate {
                self.ops.mutate_link_weights(&mut child, false, rng);
            }

            let generation = parent_a.generation.max(parent_b.generation) + 1;
            let organism = Organism::new(self.next_id, child, generation);
            self.next_id += 1;
            offspring.push(organism);
        }

        let best_fitness = survivors
            .iter()
            .map(|o| o.avg_fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let avg_fitness =
            survivors.iter().map(|o| o.avg_fitness).sum::<f64>() / survivors.len() as f64;
        let stats = GenerationStats {
            generation: self.generation,
            survivors: survivors.len(),
            offspring: offspring.len(),
            best_fitness,
            avg_fitness,
        };
        tracing::info!(
            generation = stats.generation,
            survivors = stats.survivors,
            offspring = stats.offspring,
            best = stats.best_fitness,
            "generation complete"
        );

        self.organisms = survivors;
        self.organisms.extend(offspring);
        Ok(stats)
    }

    /// The working population, consumed by the external evaluation
    /// environment.
    pub fn organisms(&self) -> &[Organism<O::Genome>] {
        &self.organisms
    }

    /// Mutable access for the environment to write fitness values.
    pub fn organisms_mut(&mut self) -> &mut [Organism<O::Genome>] {
        &mut self.organisms
    }

    pub fn archive(&self) -> &NoveltyArchive {
        &self.archive
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Clear the archive between independent runs. The population and id
    /// counter are left intact.
    pub fn reset_archive(&mut self) {
        self.archive.reset();
    }
}

/// Normalize survivor fitness to [0, 1], age each survivor by one generation,
/// and return the fitness-proportionate selection probabilities.
///
/// A flat fitness landscape (min == max) is handled by lowering the minimum
/// slightly so every survivor normalizes to 1.0 instead of dividing by zero.
fn shape_fitness<G>(
    survivors: &mut [Organism<G>],
    generation: u32,
) -> Result<Vec<f64>, EvolutionError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for organism in survivors.iter() {
        min = min.min(organism.avg_fitness);
        max = max.max(organism.avg_fitness);
    }
    if min == max {
        min -= 0.01;
    }

    let mut fitness_sum = 0.0;
    for organism in survivors.iter_mut() {
        organism.age += 1;
        organism.adj_fitness = (organism.avg_fitness - min) / (max - min);
        fitness_sum += organism.adj_fitness;
    }

    if !fitness_sum.is_finite() || fitness_sum <= 0.0 {
        return Err(EvolutionError::DegenerateFitness {
            generation,
            survivors: survivors.len(),
        });
    }

    Ok(survivors
        .iter()
        .map(|o| o.adj_fitness / fitness_sum)
        .collect())
}
