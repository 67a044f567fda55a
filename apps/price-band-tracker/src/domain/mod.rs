//! Domain Layer - Position state machine and trading types.
//!
//! Pure logic with no I/O. The engine is driven one price at a time by
//! the application layer.

/// Position lifecycle and threshold evaluation.
pub mod position;
