//! mtrmeter - Repeatedly measure the network path to a host with `mtr`.
//!
//! This crate runs `mtr` in report mode against a single host, normalizes each
//! comma separated report into typed hop records and accumulates the records
//! across repeated probes, retrying temporary name resolution failures with a
//! bounded budget.
//!
//! # Example
//!
//! The following example probes a host with the default configuration until
//! the host cannot be resolved, printing each batch of hop records as it
//! arrives:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use mtrmeter_core::Builder;
//!
//! let accumulation = Builder::new("example.com")
//!     .build()?
//!     .run_with(|batch| println!("{batch:?}"))?;
//! println!("{:?}", accumulation.termination);
//! # Ok(())
//! # }
//! ```
//!
//! The following example runs a single probe and normalizes the report:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use std::num::NonZeroUsize;
//! use mtrmeter_core::{normalize, BlockingProber, MeasurementCount, Prober};
//!
//! let prober = BlockingProber::default();
//! let count = MeasurementCount(NonZeroUsize::new(10).unwrap());
//! let report = prober.invoke("example.com", count)?;
//! for hop in normalize(&report.stdout)? {
//!     println!("{} {} {}", hop.hop, hop.ip, hop.avg);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build an [`Accumulator`].
//! - [`Accumulator::run`] - Run the accumulation loop on the current thread.
//! - [`Accumulator::run_with`] - Run the accumulation loop with a batch handler.
//! - [`CooperativeProber`] - Run probes on a cooperative scheduler.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn
)]

mod accumulator;
mod builder;
mod cancel;
mod config;
mod error;
mod normalize;
mod probe;
mod result;
mod types;

pub use accumulator::{Accumulation, Accumulator, State, Summary, Termination};
pub use builder::Builder;
pub use cancel::Cancellation;
pub use config::{defaults, ProbeConfig};
pub use error::{Error, ExitCode, ParseError, Result};
pub use normalize::{normalize, HopRecord, COLUMN_NAMES};
pub use probe::{
    classify, command_args, BlockingProber, CooperativeProber, Prober,
    PERMANENT_RESOLUTION_FAILURE, TRANSIENT_RESOLUTION_FAILURE,
};
pub use result::ResultSet;
pub use types::{MaxRetries, MaxRounds, MeasurementCount, ProbeOutput, ProbeReport};
