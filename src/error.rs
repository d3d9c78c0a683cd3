use thiserror::Error;

/// Fatal conditions raised by a generation transition.
///
/// None of these are retried internally; the caller decides whether to
/// re-invoke `evolve` with corrected inputs.
#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error(
        "generation {generation}: got {descriptors} descriptors for {organisms} organisms"
    )]
    ArityMismatch {
        generation: u32,
        organisms: usize,
        descriptors: usize,
    },

    #[error("descriptor has {got} dimensions, archive holds {expected}-dimensional descriptors")]
    DescriptorShapeMismatch { expected: usize, got: usize },

    #[error("generation {generation}: fitness sum over {survivors} survivors is zero or non-finite")]
    DegenerateFitness { generation: u32, survivors: usize },

    #[error("generation {generation}: archive curation left no survivors")]
    EmptySurvivorSet { generation: u32 },

    #[error("checkpoint I/O failed: {0}")]
    CheckpointIo(#[from] std::io::Error),

    #[error("checkpoint (de)serialization failed: {0}")]
    CheckpointFormat(#[from] serde_json::Error),
}
