//! Herald Test - Shared test utilities for Herald crates.
//!
//! Add as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! herald-test.workspace = true
//! ```
//!
//! Then record listener activity from callbacks:
//!
//! ```rust
//! use herald_test::CallLog;
//!
//! let log = CallLog::new();
//! let sink = log.clone();
//! let callback = move |name: &str| sink.push(name);
//!
//! callback("first");
//! callback("second");
//! assert_eq!(log.calls(), vec!["first", "second"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod harness;
pub mod recorder;

pub use harness::*;
pub use recorder::*;
