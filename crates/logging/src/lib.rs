#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the diagnostics plumbing shared by the delta workspace.
//! Library crates emit [`tracing`] events through the subsystem macros
//! ([`trace_genr!`], [`trace_delta!`], [`trace_send!`], [`trace_recv!`],
//! [`trace_io!`]); only the executable installs a subscriber via
//! [`init_tracing`].
//!
//! # Design
//!
//! Verbosity follows rsync's model: a `-v` count expands into per-subsystem
//! debug levels ([`VerbosityConfig::from_verbose_level`]) and individual
//! subsystems can be raised with `--debug=FLAG[N]` style tokens
//! ([`VerbosityConfig::apply_debug_flag`]). The configuration is rendered as
//! an [`EnvFilter`](tracing_subscriber::EnvFilter) directive so events under
//! `rdelta::<subsystem>` targets are filtered by the standard machinery.
//!
//! # Examples
//!
//! ```
//! use logging::{DebugFlag, VerbosityConfig};
//!
//! let mut config = VerbosityConfig::from_verbose_level(1);
//! config.apply_debug_flag("delta3").unwrap();
//! assert_eq!(config.debug.get(DebugFlag::Delta), 3);
//! assert!(config.filter_directives().contains("rdelta::delta=trace"));
//! ```

mod config;
mod levels;
mod subscriber;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels};
pub use subscriber::{LOG_ENV_VAR, init_tracing};

#[doc(hidden)]
pub use tracing;
