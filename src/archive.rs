use crate::config::EvolutionConfig;
use crate::error::EvolutionError;
use crate::organism::{Descriptor, Organism};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One curated organism: its id, a fitness snapshot, the novelty score it was
/// admitted with, and a private copy of its behavioral descriptor.
///
/// The fitness snapshot is refreshed from the live population at the start of
/// every generation, so eviction comparisons always see current values. The
/// archive never owns organism lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: u64,
    pub fitness: f64,
    pub novelty_score: f64,
    pub descriptor: Descriptor,
}

/// Distance from a candidate to one stored entry. Lives only within a single
/// admission attempt.
struct Neighbor {
    index: usize,
    distance: f64,
}

/// Bounded-diversity archive of behaviorally distinct organisms.
///
/// The archive persists across generations. It grows while a candidate's
/// nearest stored neighbor is at least `novelty_threshold` away, replaces a
/// lone cell occupant that is less novel or less fit than the candidate, and
/// otherwise rejects. Admission order matters: the controller feeds candidates
/// in fitness-descending order so fitter organisms get first claim on
/// contested cells.
#[derive(Debug)]
pub struct NoveltyArchive {
    novelty_threshold: f64,
    novelty_neighbors: usize,
    min_archive_size: usize,
    entries: Vec<ArchiveEntry>,
    ids: HashSet<u64>,
}

impl NoveltyArchive {
    pub fn new(config: &EvolutionConfig) -> Self {
        Self {
            novelty_threshold: config.novelty_threshold,
            novelty_neighbors: config.novelty_neighbors,
            min_archive_size: config.min_archive_size,
            entries: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Rebuild an archive from checkpointed entries.
    pub fn restore(config: &EvolutionConfig, entries: Vec<ArchiveEntry>) -> Self {
        let ids = entries.iter().map(|e| e.id).collect();
        Self {
            novelty_threshold: config.novelty_threshold,
            novelty_neighbors: config.novelty_neighbors,
            min_archive_size: config.min_archive_size,
            entries,
            ids,
        }
    }

    /// Decide admission for one candidate, possibly evicting an existing entry.
    ///
    /// Resubmitting an id already in the archive is a silent no-op. While the
    /// archive is still warming up (size at or below `min_archive_size`) every
    /// candidate is admitted with the novelty threshold as a placeholder
    /// score. Past warm-up the decision is driven by the distances to the
    /// nearest and second-nearest stored descriptors.
    pub fn attempt_add<G>(
        &mut self,
        organism: &Organism<G>,
        descriptor: &[f64],
    ) -> Result<(), EvolutionError> {
        if self.ids.contains(&organism.id) {
            return Ok(());
        }

        if let Some(expected) = self.descriptor_len() {
            if descriptor.len() != expected {
                return Err(EvolutionError::DescriptorShapeMismatch {
                    expected,
                    got: descriptor.len(),
                });
            }
        }

        // Warm-up: admit unconditionally until past the configured minimum.
        // The comparison is inclusive, so warm-up actually fills
        // min_archive_size + 1 slots.
        if self.entries.len() <= self.min_archive_size {
            tracing::debug!(id = organism.id, size = self.entries.len() + 1, "archive warm-up admit");
            self.insert(organism, self.novelty_threshold, descriptor);
            return Ok(());
        }

        let mut neighbors: Vec<Neighbor> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Neighbor {
                index,
                distance: euclidean(descriptor, &entry.descriptor),
            })
            .collect();
        // Stable sort: distance ties keep archive order.
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let novelty_score = self.mean_neighbor_distance(&neighbors);
        let nearest = &neighbors[0];

        if nearest.distance >= self.novelty_threshold {
            // Unoccupied novelty region.
            tracing::debug!(
                id = organism.id,
                nearest = nearest.distance,
                novelty = novelty_score,
                "archive admit"
            );
            self.insert(organism, novelty_score, descriptor);
            return Ok(());
        }

        // A missing second-nearest (single-entry archive) counts as beyond
        // the threshold: the cell has exactly one occupant.
        let second_beyond = neighbors
            .get(1)
            .map_or(true, |n| n.distance >= self.novelty_threshold);

        if second_beyond {
            let occupant = &self.entries[nearest.index];
            // Either condition alone evicts; the replacement-biased OR is
            // part of the algorithm.
            if occupant.novelty_score < novelty_score || occupant.fitness < organism.avg_fitness {
                tracing::debug!(
                    id = organism.id,
                    evicted = occupant.id,
                    novelty = novelty_score,
                    "archive evict-and-admit"
                );
                let evicted = self.entries.remove(nearest.index);
                self.ids.remove(&evicted.id);
                self.insert(organism, novelty_score, descriptor);
            }
            return Ok(());
        }

        // Both neighbors below threshold: ambiguous cell ownership, reject.
        Ok(())
    }

    /// Mean distance to the `min(novelty_neighbors, len)` nearest entries,
    /// assuming `neighbors` is sorted ascending.
    fn mean_neighbor_distance(&self, neighbors: &[Neighbor]) -> f64 {
        let k = self.novelty_neighbors.min(neighbors.len());
        neighbors[..k].iter().map(|n| n.distance).sum::<f64>() / k as f64
    }

    fn insert<G>(&mut self, organism: &Organism<G>, novelty_score: f64, descriptor: &[f64]) {
        self.entries.push(ArchiveEntry {
            id: organism.id,
            fitness: organism.avg_fitness,
            novelty_score,
            descriptor: descriptor.to_vec(),
        });
        self.ids.insert(organism.id);
    }

    /// Refresh each entry's fitness snapshot from the live population.
    pub fn update_fitness<G>(&mut self, organisms: &[Organism<G>]) {
        let fitness: HashMap<u64, f64> = organisms.iter().map(|o| (o.id, o.avg_fitness)).collect();
        for entry in &mut self.entries {
            if let Some(&f) = fitness.get(&entry.id) {
                entry.fitness = f;
            }
        }
    }

    /// Ids of the curated organisms, in archive order. This is the survivor
    /// set for the next generation.
    pub fn organism_ids(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality established by the stored descriptors, if any.
    pub fn descriptor_len(&self) -> Option<usize> {
        self.entries.first().map(|e| e.descriptor.len())
    }

    /// Clear the archive between independent runs.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}

/// L2 distance between two descriptors.
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
