pub mod doctor;
pub mod shell;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;

use fixwatch_proto::PositionFix;

/// Error condition exposed by a position source.
///
/// `NoError` is a real state, not an absence: accepting a fix resets the
/// condition to it. Reads are level-triggered; the event stream carries the
/// edge (one `SourceEvent::Error` per transition into a non-`NoError` value).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceError {
    #[default]
    #[error("no error")]
    NoError,
    /// Empty script, or the feed process could not be started.
    #[error("position source unavailable")]
    SourceUnavailable,
    /// The feed reported a non-Ready status.
    #[error("position feed closed")]
    Closed,
    /// A record with an unparseable timestamp or numeric field.
    #[error("malformed position data")]
    MalformedData,
}

#[derive(Debug, Clone)]
pub enum SourceEvent {
    PositionUpdated(PositionFix),
    Error(SourceError),
    UpdateTimeout,
}

/// Generic position source abstraction.
///
/// Calls never block: commands are handed to the source's own control task,
/// and outcomes surface through `error()` and the subscribed event stream.
pub trait PositionSource {
    /// Floor for the update cadence.
    fn minimum_update_interval(&self) -> Duration;

    /// Most recent accepted fix, if any.
    fn last_known_position(&self) -> Option<PositionFix>;

    /// Current error condition.
    fn error(&self) -> SourceError;

    fn subscribe(&self) -> broadcast::Receiver<SourceEvent>;

    /// Begin continuous updates until `stop_updates()`.
    fn start_updates(&self);

    /// Stop continuous updates. Idempotent.
    fn stop_updates(&self);

    /// Ask for exactly one fix. A zero timeout selects a generous default;
    /// a timeout below `minimum_update_interval()` signals `UpdateTimeout`
    /// immediately without touching the feed.
    fn request_update(&self, timeout: Duration);
}
