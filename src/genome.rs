use rand::RngCore;

/// Capability interface over an opaque genome encoding.
///
/// The evolution core consumes this trait and never implements it: genome
/// internals stay on the far side of the boundary, and only fitness scalars,
/// descriptors, and organism identities cross it. All stochastic operators
/// receive the run's random source so a fixed seed reproduces a run end to
/// end.
pub trait GenomeOps {
    /// The opaque genome encoding.
    type Genome;

    /// Explicitly duplicate a genome. Genomes are never copied implicitly.
    fn clone_genome(&self, genome: &Self::Genome) -> Self::Genome;

    /// Insert a new node into the genome's structure.
    fn mutate_add_node(&mut self, genome: &mut Self::Genome, rng: &mut dyn RngCore);

    /// Insert a new link into the genome's structure.
    fn mutate_add_link(&mut self, genome: &mut Self::Genome, rng: &mut dyn RngCore);

    /// Perturb link weights. With `randomize_all` set, every weight is drawn
    /// fresh instead of perturbed — used once at initial spawn.
    fn mutate_link_weights(
        &mut self,
        genome: &mut Self::Genome,
        randomize_all: bool,
        rng: &mut dyn RngCore,
    );

    /// Structural/weight distance between two genomes, as used by external
    /// species clustering.
    fn compatibility_distance(&self, a: &Self::Genome, b: &Self::Genome) -> f64;

    /// Crossover weighted toward the fitter parent.
    fn reproduce_directional(
        &mut self,
        a: &Self::Genome,
        b: &Self::Genome,
        fitness_a: f64,
        fitness_b: f64,
        rng: &mut dyn RngCore,
    ) -> Self::Genome;
}
