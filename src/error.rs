//! Error surface for the sweep engine.

/// Fatal errors from [`crate::run_sweep_line`].
///
/// Non-fatal conditions — like the status structure's synthetic keys
/// drifting close together — are logged and recovered locally (see
/// [`crate::status::StatusMap`]) and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("segment {index} is malformed: {reason}")]
    MalformedSegment { index: usize, reason: &'static str },
    #[error("segments {a} and {b} overlap over a positive-length span")]
    InfiniteOverlap { a: usize, b: usize },
    #[error("internal invariant violated: {0}")]
    ProgrammingInvariant(&'static str),
}
