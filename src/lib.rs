//! Small Basic runtime with a name-based call boundary.
//!
//! The runtime classes live in [`smallbasic_runtime`]; this crate adds the
//! [`builtins`] table that lets a host call them as `"Class.Operation"`.

pub mod builtins;

pub use smallbasic_runtime as runtime;
pub use smallbasic_runtime::{Host, Runtime, RuntimeConfig, RuntimeError, RuntimeResult, Value};
