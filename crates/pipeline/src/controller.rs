//! Per-mention state machine tying resolution, acquisition, compression and
//! publication together with user-visible feedback.
//!
//! ```text
//! Idle -> Resolving -> Acquiring -> Compressing -> Publishing -> Done
//!            \            \             \              \
//!             +------------+-------------+--------------+--> Failed(reason)
//! ```
//!
//! Every stage returns a typed error; the controller maps it to a
//! [`FailureReason`], logs it, and sends one apology. Nothing escapes
//! [`DialogueController::handle`], panics included.

use std::{panic::AssertUnwindSafe, path::PathBuf, sync::Arc};

use {
    futures::FutureExt,
    tracing::{Instrument, debug, error, info, info_span, warn},
    uuid::Uuid,
};

use crate::{
    acquirer::{AcquireError, Acquirer},
    compressor::{Compress, CompressError},
    platform::{ChatPlatform, PlatformError},
    publisher::{PublishError, PublishedLink, Publisher},
    replies::Reply,
    request::{InboundRequest, ReplyTarget},
    resolver::{InputResolver, Rejection},
    scratch::WorkArtifact,
};

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Acquiring,
    Compressing,
    Publishing,
    Done,
    Failed(FailureReason),
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Rejected(Rejection),
    Acquisition,
    Compression,
    Publish,
    Platform,
    /// A stage panicked.
    Internal,
}

/// Union of every stage's error type.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl StageError {
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Rejected(r) => FailureReason::Rejected(*r),
            Self::Acquire(_) => FailureReason::Acquisition,
            Self::Compress(_) => FailureReason::Compression,
            Self::Publish(_) => FailureReason::Publish,
            Self::Platform(_) => FailureReason::Platform,
        }
    }
}

/// What happened during one run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub job_id: Uuid,
    /// Every state visited, starting with `Idle` and ending in a terminal.
    pub stages: Vec<Stage>,
    pub link: Option<PublishedLink>,
}

impl PipelineReport {
    pub fn terminal(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Idle)
    }
}

struct Run {
    job_id: Uuid,
    stages: Vec<Stage>,
}

impl Run {
    fn new(job_id: Uuid) -> Self {
        Self {
            job_id,
            stages: vec![Stage::Idle],
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!(stage = ?stage, "stage transition");
        self.stages.push(stage);
    }
}

/// Orchestrates one mention from resolution to the final link.
pub struct DialogueController {
    platform: Arc<dyn ChatPlatform>,
    resolver: InputResolver,
    acquirer: Acquirer,
    compressor: Arc<dyn Compress>,
    publisher: Publisher,
    scratch_root: PathBuf,
}

impl DialogueController {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        resolver: InputResolver,
        acquirer: Acquirer,
        compressor: Arc<dyn Compress>,
        publisher: Publisher,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            resolver,
            acquirer,
            compressor,
            publisher,
            scratch_root: scratch_root.into(),
        }
    }

    /// Run the full pipeline for one mention. Never fails; the outcome is in
    /// the returned report and in the messages posted to the thread.
    pub async fn handle(&self, request: InboundRequest) -> PipelineReport {
        let job_id = Uuid::new_v4();
        let span = info_span!(
            "pipeline",
            job_id = %job_id,
            channel = %request.channel_id,
            user = %request.user_id,
        );
        self.run(job_id, &request).instrument(span).await
    }

    async fn run(&self, job_id: Uuid, request: &InboundRequest) -> PipelineReport {
        info!("mention received");
        let target = request.reply_target();
        let mut run = Run::new(job_id);

        let outcome = AssertUnwindSafe(self.advance(&mut run, request, &target))
            .catch_unwind()
            .await;

        let mut link = None;
        let failure = match outcome {
            Ok(Ok(published)) => {
                run.enter(Stage::Done);
                info!(url = %published.url, "pipeline finished");
                link = Some(published);
                None
            },
            Ok(Err(StageError::Rejected(rejection))) => {
                info!(reason = %rejection, "request rejected");
                Some(FailureReason::Rejected(rejection))
            },
            Ok(Err(err)) => {
                let stage = run.stages.last().copied().unwrap_or(Stage::Idle);
                error!(stage = ?stage, error = %err, "pipeline failed");
                Some(err.reason())
            },
            Err(_) => {
                error!("pipeline stage panicked");
                Some(FailureReason::Internal)
            },
        };

        if let Some(reason) = failure {
            run.enter(Stage::Failed(reason));
            if let Err(e) = self.platform.send_reply(&target, &Reply::apology()).await {
                warn!(error = %e, "failed to deliver apology");
            }
        }

        PipelineReport {
            job_id: run.job_id,
            stages: run.stages,
            link,
        }
    }

    async fn advance(
        &self,
        run: &mut Run,
        request: &InboundRequest,
        target: &ReplyTarget,
    ) -> Result<PublishedLink, StageError> {
        run.enter(Stage::Resolving);
        let source = match self.resolver.resolve(request) {
            Ok(source) => source,
            Err(rejection) => {
                if let Err(e) = self
                    .platform
                    .send_reply(target, &Reply::rejection(rejection))
                    .await
                {
                    warn!(error = %e, "failed to deliver rejection");
                }
                return Err(rejection.into());
            },
        };
        debug!(
            locator = %source.locator,
            filename = %source.filename,
            method = ?source.method,
            "source resolved"
        );

        run.enter(Stage::Acquiring);
        self.platform
            .send_reply(target, &Reply::work_started())
            .await?;
        let artifact = WorkArtifact::create(&self.scratch_root, run.job_id).map_err(|source| {
            AcquireError::Io {
                path: self.scratch_root.clone(),
                source,
            }
        })?;
        let original = artifact.original_path();
        let fetched = self.acquirer.fetch(&source, &original).await?;
        info!(bytes = fetched, filename = %source.filename, "source acquired");

        run.enter(Stage::Compressing);
        let compressed = artifact.compressed_path();
        self.compressor.compress(&original, &compressed).await?;
        if let Ok(meta) = tokio::fs::metadata(&compressed).await {
            info!(before = fetched, after = meta.len(), "document compressed");
        }

        run.enter(Stage::Publishing);
        let folder = self.platform.destination_name(request).await?;
        let link = self
            .publisher
            .publish(&compressed, &source.output_filename(), &folder)
            .await?;

        self.platform
            .send_reply(target, &Reply::done(&link.url))
            .await?;
        Ok(link)
    }
}
