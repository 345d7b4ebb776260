//! ThinkControl BCI Native - Host control loop
//!
//! This crate runs the `no_std` decoder from `thinkcontrol-bci-core` on a
//! host:
//! - Cancellable fixed-cadence tick timer on tokio
//! - Idle/Running session with start, stop, reset and forced classification
//! - Tick updates broadcast to any number of renderers
//! - Monotonic and wall clock from the host
//!
//! # Modules
//!
//! - [`control_loop`]: The session and its published updates
//! - [`timer`]: Repeating timer with cancellation tokens
//! - [`clock`]: Host clock
//! - [`error`]: Error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod control_loop;
pub mod error;
pub mod timer;

// Re-export key types
pub use clock::SystemClock;
pub use control_loop::{ControlLoop, TickUpdate, UPDATE_CHANNEL_CAPACITY};
pub use error::{LoopError, LoopResult};
pub use timer::{CancellationToken, RepeatingTimer};
