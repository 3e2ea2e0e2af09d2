//! Verdicts for simulator runs.
//!
//! Two protocols decide whether a run passed:
//!
//! - [`SentinelProtocol`]: the test binary writes a magic value into a
//!   designated register and the harness classifies it.
//! - [`Expectation`]: a declarative list of properties (registers, cycle
//!   bounds, stdout markers, trace quality) checked by [`verify`].
//!
//! Both produce a [`Verdict`]. An inconclusive run is `Error`, never `Fail`.

mod sentinel;
mod verdict;
pub mod verify;

pub use sentinel::SentinelProtocol;
pub use verdict::{CheckOutcome, Verdict, VerdictStatus};
pub use verify::{CycleBounds, ExitPolicy, Expectation, Verification, verify};
