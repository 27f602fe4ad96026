//! Form fill and submit engine.
//!
//! One engine, one protocol: the fill/submit flow lives here once, behind the
//! narrow [`BrowserPort`] capability. Backends (a CDP adapter today) plug in
//! underneath without duplicating any protocol logic.
//!
//! The engine runs strictly sequentially: readiness gate, schema-ordered
//! field application, then the bounded submission loop. All waits are
//! fixed-interval sleeps.

pub mod apply;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod model;
pub mod ports;
pub mod readiness;
pub mod resolver;
pub mod submit;

pub use config::EngineConfig;
pub use diagnostics::DiagnosticsSink;
pub use engine::FillEngine;
pub use errors::{ApplyError, EngineError, PortError};
pub use model::{FillOutcome, MissingField};
pub use ports::{BrowserPort, ControlId};
