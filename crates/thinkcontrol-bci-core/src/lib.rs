//! ThinkControl BCI Core - `no_std` decoder loop
//!
//! This crate implements the closed motor-imagery feedback loop: synthetic
//! sensorimotor EEG, a left/right classifier with label persistence, cursor
//! integration with target-zone scoring, and a bounded classification log.
//! It performs no I/O and reads no ambient state; randomness and time are
//! injected, so a seeded session replays exactly.
//!
//! # Modules
//!
//! - [`types`]: Channels, labels, cursor/history records and snapshots
//! - [`error`]: Configuration errors
//! - [`config`]: Loop configuration and validation
//! - [`clock`]: Injected time sources
//! - [`signal`]: Signal synthesizer and rolling sample windows
//! - [`classifier`]: Motor imagery classifier
//! - [`cursor`]: Cursor integrator and hit scoring
//! - [`history`]: Newest-first classification log
//! - [`decoder`]: The per-tick transition tying everything together
//!
//! # Features
//!
//! - `std`: Enable standard library support (`std::error::Error` impls)
//! - `defmt`: Enable `defmt` formatting for embedded logging
//!
//! # Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use thinkcontrol_bci_core::clock::ManualClock;
//! use thinkcontrol_bci_core::{DecoderConfig, DecoderCore};
//!
//! let mut core = DecoderCore::new(
//!     DecoderConfig::default(),
//!     StdRng::seed_from_u64(7),
//!     ManualClock::default(),
//! )
//! .expect("default config is valid");
//!
//! let transition = core.tick();
//! assert!((0.0..=100.0).contains(&transition.snapshot.cursor_position));
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod classifier;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod history;
pub mod signal;
pub mod types;

// Re-export commonly used types at crate root
pub use classifier::MotorImageryClassifier;
pub use clock::{Clock, ManualClock};
pub use config::{DecoderConfig, HitScoring};
pub use cursor::{CursorIntegrator, CursorUpdate};
pub use decoder::{DecoderCore, Transition};
pub use error::ConfigError;
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use signal::{ChannelSample, SampleWindow, SignalSynthesizer, WINDOW_CAPACITY};
pub use types::{
    Channel, ClassificationState, ClockTime, CursorState, CursorZone, HistoryEntry, HitEvent,
    Label, RunState, Snapshot,
};
