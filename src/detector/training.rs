use std::path::PathBuf;

use super::{
    artifact::{ModelArtifact, ModelError},
    corpus::read_corpus,
    isolation_forest::ForestParams,
};

/// The three labeled corpora the offline model is fit on.
#[derive(Debug, Clone)]
pub struct TrainingCorpora {
    pub normal: PathBuf,
    pub high_load: PathBuf,
    pub malicious: PathBuf,
}

impl TrainingCorpora {
    fn paths(&self) -> [(&'static str, &PathBuf); 3] {
        [
            ("normal", &self.normal),
            ("high_load", &self.high_load),
            ("malicious", &self.malicious),
        ]
    }
}

pub fn train_from_corpora(
    corpora: &TrainingCorpora,
    params: ForestParams,
) -> Result<ModelArtifact, ModelError> {
    let mut rows = Vec::new();
    for (label, path) in corpora.paths() {
        let corpus = read_corpus(path)?;
        log::info!(
            "training_corpus_loaded label={} path={} rows={}",
            label,
            path.display(),
            corpus.len()
        );
        rows.extend(corpus);
    }

    if rows.is_empty() {
        return Err(ModelError::EmptyCorpus);
    }

    let artifact = ModelArtifact::train(&rows, params)?;
    log::info!(
        "model_trained samples={} trees={} sample_size={} threshold={:.4}",
        rows.len(),
        artifact.forest.tree_count(),
        artifact.forest.sample_size(),
        artifact.forest.threshold()
    );
    Ok(artifact)
}
