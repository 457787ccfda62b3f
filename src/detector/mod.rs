mod artifact;
mod corpus;
mod half_space;
mod isolation_forest;
mod training;

pub use artifact::{Classifier, ModelArtifact, ModelError, Verdict};
pub use corpus::{CorpusError, append_corpus, read_corpus};
pub use half_space::{FeatureLimits, HalfSpaceParams, HalfSpaceTrees, OnlineScorer};
pub use isolation_forest::{ForestParams, IsolationForest};
pub use training::{TrainingCorpora, train_from_corpora};
