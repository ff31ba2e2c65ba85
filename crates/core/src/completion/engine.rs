use super::assembler::{assemble, Candidate};
use super::context::{classify, CompletionContext};
use super::resolver::Resolver;
use crate::index::ModelIndex;
use crate::limits::Limits;
use crate::vocabulary::Vocabulary;
use modelpeek_api::{Model, SelectorEvaluator};
use std::sync::Arc;
use tracing::{debug, info};

/// Completion entry point for one loaded model.
///
/// Cloning is cheap: the model, evaluator and index are shared. The index is
/// built once at construction; call [`CompletionEngine::rebuild_index`] after
/// the model changes.
#[derive(Clone)]
pub struct CompletionEngine {
    model: Arc<dyn Model>,
    evaluator: Arc<dyn SelectorEvaluator>,
    index: Arc<ModelIndex>,
}

impl CompletionEngine {
    pub fn new(
        model: Arc<dyn Model>,
        evaluator: Arc<dyn SelectorEvaluator>,
        vocabulary: Vocabulary,
        limits: Limits,
    ) -> Self {
        let index = ModelIndex::build(model.as_ref(), vocabulary, limits);
        Self::with_index(model, evaluator, index)
    }

    /// Engine over a prebuilt index (useful for testing)
    pub fn with_index(
        model: Arc<dyn Model>,
        evaluator: Arc<dyn SelectorEvaluator>,
        index: ModelIndex,
    ) -> Self {
        Self {
            model,
            evaluator,
            index: Arc::new(index),
        }
    }

    pub fn index(&self) -> &ModelIndex {
        &self.index
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn evaluator(&self) -> &Arc<dyn SelectorEvaluator> {
        &self.evaluator
    }

    /// Rescans the model, keeping the current vocabulary and limits.
    pub fn rebuild_index(&mut self) {
        info!("Rebuilding completion index");
        let index = ModelIndex::build(
            self.model.as_ref(),
            self.index.vocabulary().clone(),
            self.index.limits().clone(),
        );
        self.index = Arc::new(index);
    }

    /// Classifies `text` at `cursor` (a character position).
    pub fn classify(&self, text: &str, cursor: usize) -> CompletionContext {
        classify(self.index.vocabulary(), text, cursor)
    }

    /// Ordered candidates for `text` at `cursor`. Never fails; an
    /// unclassifiable or unevaluable position yields fewer candidates.
    pub fn complete(&self, text: &str, cursor: usize) -> Vec<Candidate> {
        self.complete_with_context(text, cursor).1
    }

    pub fn complete_with_context(
        &self,
        text: &str,
        cursor: usize,
    ) -> (CompletionContext, Vec<Candidate>) {
        let ctx = self.classify(text, cursor);
        let resolver = Resolver::new(self.model.as_ref(), self.evaluator.as_ref(), &self.index);
        let raw = resolver.candidates(&ctx);
        let candidates = assemble(
            raw,
            &ctx.current_word,
            ctx.replace_offset,
            self.index.limits().max_candidates,
        );
        debug!(
            "complete {:?} at {} -> {:?}, {} candidates",
            text,
            cursor,
            ctx.subkind,
            candidates.len()
        );
        (ctx, candidates)
    }
}
