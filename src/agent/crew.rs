//! Pipeline driver
//!
//! Runs Retriever → Critic → Composer strictly in order, advancing the
//! pipeline state machine after each stage. The first failing stage moves
//! the run to `Failed` and its error is returned; no partial output escapes.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::agent::composer::{Answer, Composer};
use crate::agent::critic::{Critic, Critique};
use crate::agent::state::{PipelineEvent, PipelineState, Stage};
use crate::config::Config;
use crate::document::{
    pdf, Chunker, DocumentIndex, Embedder, IndexCache, OllamaEmbedder, PassageSet, SearchParams,
};
use crate::errors::{PipelineError, Result};
use crate::llm::{ChatClient, CompletionService};
use crate::rag::{ContextBuilder, Retriever};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

/// Progress notifications emitted during a run
#[derive(Debug)]
pub enum CrewEvent<'a> {
    StageStarted(Stage),
    Retrieved(&'a PassageSet),
    Critiqued(&'a Critique),
    Answered(&'a Answer),
    StageFailed(Stage, &'a PipelineError),
}

/// Receives progress notifications; used for console output
pub trait StageObserver: Send + Sync {
    fn on_event(&self, event: CrewEvent<'_>);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_event(&self, _event: CrewEvent<'_>) {}
}

/// Everything a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    pub question: String,
    pub passages: PassageSet,
    pub critique: Critique,
    pub answer: Answer,
    #[serde(skip)]
    pub telemetry: TelemetryCollector,
}

/// State and telemetry of one run
struct RunTracker<'a> {
    state: PipelineState,
    telemetry: TelemetryCollector,
    observer: &'a dyn StageObserver,
}

impl<'a> RunTracker<'a> {
    fn new(observer: &'a dyn StageObserver) -> Self {
        Self {
            state: PipelineState::Idle,
            telemetry: TelemetryCollector::new(),
            observer,
        }
    }

    fn transition(&mut self, event: PipelineEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        self.telemetry.record(TelemetryEvent::StateTransition {
            from: self.state,
            to: next,
            timestamp: Instant::now(),
        });
        self.state = next;
        Ok(())
    }

    /// Run the stage belonging to the current state
    async fn run_stage<T, F>(&mut self, work: F, on_success: PipelineEvent) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let stage = self.state.active_stage().ok_or_else(|| PipelineError::InvalidTransition {
            from: format!("{:?}", self.state),
            event: format!("{:?}", on_success),
            reason: "no stage is active".to_string(),
        })?;

        let started = Instant::now();
        self.telemetry.record(TelemetryEvent::StageStarted {
            stage,
            timestamp: started,
        });
        self.observer.on_event(CrewEvent::StageStarted(stage));
        info!(%stage, role = stage.agent_role(), "{}", self.state.display_name());

        let result = work.await;
        let duration_ms = started.elapsed().as_millis() as u64;

        self.telemetry.record(TelemetryEvent::StageCompleted {
            stage,
            duration_ms,
            success: result.is_ok(),
            timestamp: Instant::now(),
        });

        match result {
            Ok(value) => {
                self.transition(on_success)?;
                Ok(value)
            }
            Err(e) => {
                error!(%stage, error = %e, "Stage failed");
                self.observer.on_event(CrewEvent::StageFailed(stage, &e));
                self.transition(PipelineEvent::StageFailed)?;
                Err(e)
            }
        }
    }
}

/// Sequential three-agent pipeline over one document
pub struct Crew {
    retriever: Retriever,
    critic: Critic,
    composer: Composer,
    observer: Arc<dyn StageObserver>,
}

impl Crew {
    /// Assemble a crew around an existing index and completion service
    pub fn new(
        index: Arc<DocumentIndex>,
        llm: Arc<dyn CompletionService>,
        params: SearchParams,
    ) -> Self {
        let context = ContextBuilder::new();
        Self {
            retriever: Retriever::with_params(index, params),
            critic: Critic::new(llm.clone(), context.clone()),
            composer: Composer::new(llm, context),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach a progress observer
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build everything a run needs from configuration
    ///
    /// The document is checked before any network call, so a missing PDF
    /// fails here with `FileAccess`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        pdf::check_readable(&config.document.pdf_path)?;

        let llm: Arc<dyn CompletionService> = Arc::new(ChatClient::from_config(&config.llm)?);
        let index = Self::open_index(config).await?;

        Ok(Self::new(Arc::new(index), llm, search_params(config)))
    }

    /// Build (or reuse from cache) the document index described by `config`
    pub async fn open_index(config: &Config) -> Result<DocumentIndex> {
        Self::index_document(config, false).await
    }

    /// Build the index from scratch, replacing any cached copy
    pub async fn refresh_index(config: &Config) -> Result<DocumentIndex> {
        Self::index_document(config, true).await
    }

    async fn index_document(config: &Config, refresh: bool) -> Result<DocumentIndex> {
        config.validate()?;
        let path = config.document.pdf_path.as_path();
        pdf::check_readable(path)?;

        let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::from_config(&config.embedding)?);
        let chunker = Chunker::new(config.document.chunk_size, config.document.chunk_overlap)?;

        if !config.document.use_cache {
            return DocumentIndex::build(path, embedder, chunker).await;
        }

        let cache = IndexCache::new(config.cache_dir());
        if refresh {
            cache.rebuild(path, embedder, chunker).await
        } else {
            cache.load_or_build(path, embedder, chunker).await
        }
    }

    /// Answer one question
    pub async fn kickoff(&self, question: &str) -> Result<CrewOutput> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        let mut run = RunTracker::new(self.observer.as_ref());
        run.transition(PipelineEvent::Start)?;

        let passages = run
            .run_stage(self.retriever.retrieve(question), PipelineEvent::PassagesReady)
            .await?;
        self.observer.on_event(CrewEvent::Retrieved(&passages));

        let critique = run
            .run_stage(
                self.critic.critique(question, &passages),
                PipelineEvent::CritiqueReady,
            )
            .await?;
        self.observer.on_event(CrewEvent::Critiqued(&critique));

        let answer = run
            .run_stage(
                self.composer.compose(question, &passages, &critique),
                PipelineEvent::AnswerReady,
            )
            .await?;
        self.observer.on_event(CrewEvent::Answered(&answer));

        debug_assert_eq!(run.state, PipelineState::Done);

        Ok(CrewOutput {
            question: question.to_string(),
            passages,
            critique,
            answer,
            telemetry: run.telemetry,
        })
    }
}

/// Search parameters from the `[document]` section
pub fn search_params(config: &Config) -> SearchParams {
    SearchParams {
        top_k: config.document.top_k,
        min_score: config.document.min_score,
    }
}
