//! mtrmeter - periodically run `mtr` against a host and accumulate the results.
//!
//! This crate provides the `mtrmeter` command line tool and re-exports the
//! library used to build it.

// Re-export the user facing library, so it may be used from the mtrmeter crate directly.

/// Probe a host with `mtr` and accumulate the normalized hop records.
pub mod core {
    pub use mtrmeter_core::*;
}
