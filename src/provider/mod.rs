pub mod replicate;

pub use replicate::{ReplicateClient, Submission};
