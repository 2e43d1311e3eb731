//! A proximity-tolerant variant of the Bentley-Ottmann plane-sweep
//! algorithm for line-segment intersection.
//!
//! [`run_sweep_line`] takes a list of segments and returns every point
//! where two or more of them meet -- endpoints, T-junctions, X-crossings,
//! and concurrences of three or more -- along with the segment list as
//! adjusted by tolerance-based endpoint merging ("glomming"). Exactly
//! coincident or collinear-overlapping input is rejected; see
//! [`SweepError`].
//!
//! ```
//! use proximal_sweep::{run_sweep_line, SweepConfig};
//!
//! let segments = [
//!     [[0.0, 0.0], [2.0, 2.0]],
//!     [[0.0, 2.0], [2.0, 0.0]],
//! ];
//! let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();
//! let crossings = out.events.iter().filter(|e| e.participants.len() > 1).count();
//! assert_eq!(crossings, 1);
//! ```

mod avl;
mod comparator;
mod config;
mod error;
mod events;
mod geometry;
mod status;
mod sweep;

pub use config::SweepConfig;
pub use error::SweepError;
pub use geometry::Role;
pub use sweep::{run_sweep_line, EventRecord, SweepOutput};
