use modelpeek_api::ApiResult;
use modelpeek_core::{
    Candidate, CompletionContext, CompletionEngine, IndexStats, MemoryModel, PeekConfig,
    PeekError, QueryEngine, QueryResult, ReferenceSelector,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::info;

/// State shared by the shell loop, the completer and the one-shot commands.
#[derive(Clone)]
pub struct ShellContext {
    model_path: PathBuf,
    completion: Arc<RwLock<CompletionEngine>>,
    queries: QueryEngine,
}

impl ShellContext {
    /// Loads the model file and builds the completion index.
    pub fn open(model_path: PathBuf, config: &PeekConfig) -> Result<Self, PeekError> {
        let model = Arc::new(MemoryModel::load(&model_path)?);
        let vocabulary = config.vocabulary();
        let selector = Arc::new(ReferenceSelector::new(vocabulary.clone()));

        let completion = CompletionEngine::new(
            model.clone(),
            selector.clone(),
            vocabulary,
            config.limits.clone(),
        );
        info!(
            "Opened {} ({} elements)",
            model_path.display(),
            model.len()
        );

        Ok(Self {
            model_path,
            completion: Arc::new(RwLock::new(completion)),
            queries: QueryEngine::new(model, selector),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn model_name(&self) -> String {
        self.model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model_path.display().to_string())
    }

    fn engine(&self) -> RwLockReadGuard<'_, CompletionEngine> {
        self.completion
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn complete(&self, text: &str, cursor: usize) -> (CompletionContext, Vec<Candidate>) {
        self.engine().complete_with_context(text, cursor)
    }

    pub fn stats(&self) -> IndexStats {
        self.engine().index().stats()
    }

    /// Rescans the model and swaps in the new index.
    pub fn reindex(&self) -> IndexStats {
        let mut engine = self
            .completion
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        engine.rebuild_index();
        engine.index().stats()
    }

    pub fn execute(&self, query: &str) -> ApiResult<QueryResult> {
        self.queries.execute(query)
    }
}
