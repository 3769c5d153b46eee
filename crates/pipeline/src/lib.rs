//! Request pipeline for the PDF compression bridge.
//!
//! A mention flows through [`resolver`] → [`acquirer`] → [`compressor`] →
//! [`publisher`], driven by the [`controller`]. Chat and storage vendors plug
//! in through the [`platform::ChatPlatform`] and [`publisher::Storage`]
//! traits.

pub mod acquirer;
pub mod compressor;
pub mod controller;
pub mod platform;
pub mod publisher;
pub mod replies;
pub mod request;
pub mod resolver;
pub mod scratch;

pub use {
    acquirer::{AcquireError, Acquirer},
    compressor::{Compress, CompressError, GhostscriptCompressor},
    controller::{DialogueController, FailureReason, PipelineReport, Stage, StageError},
    platform::{ChatPlatform, PlatformError},
    publisher::{PublishError, PublishedLink, Publisher, Storage, StorageError},
    replies::{Reply, RichBody},
    request::{FileDescriptor, InboundRequest, ReplyTarget},
    resolver::{AcquisitionMethod, InputResolver, Rejection, ResolvedSource},
    scratch::WorkArtifact,
};
