//! Herald Events - in-process named-event dispatcher.
//!
//! This crate provides:
//! - [`EventRegistry`]: persistent and once-only listeners keyed by event name
//! - [`ListenerRecord`]: a listener's id, callback and optional filter
//! - [`EventHandler`]: a borrowed handle for components
//! - [`global`]: free functions over a process-wide default registry
//!
//! # Dispatch model
//!
//! Listeners for one event fire in registration order. [`EventRegistry::call`]
//! runs persistent listeners first, then once-only listeners, removing each
//! once-only listener as it runs. A filter returning `true` suppresses its
//! listener for that payload. Dispatch works on a snapshot taken under the
//! registry's lock and runs user code with the lock released, so callbacks
//! may register, cancel or dispatch on the same registry.
//!
//! # Example
//!
//! ```rust
//! use herald_events::EventRegistry;
//!
//! # fn main() -> Result<(), herald_events::EventError> {
//! let registry = EventRegistry::<u32>::new();
//!
//! let id = registry.listen(
//!     "click",
//!     |n| {
//!         println!("clicked {n}");
//!         Ok(())
//!     },
//!     None,
//! )?;
//! registry.listen_once("click", |_| Ok(()), Some(Box::new(|n: &u32| *n == 0)))?;
//!
//! assert!(registry.call("click", None, &1)?);
//! assert_eq!(registry.listener_count("click"), 1);
//!
//! assert!(registry.cancel("click", id));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod global;
pub mod prelude;

mod config;
mod error;
mod handler;
mod record;
mod registry;

pub use config::{CancelAllPolicy, FailurePolicy, RegistryConfig};
pub use error::{EventError, EventResult, ListenerFailure};
pub use handler::EventHandler;
pub use record::{BoxError, Callback, Filter, ListenerId, ListenerKind, ListenerRecord};
pub use registry::{EventRegistry, ListenerSpec};
