//! Background Tasks Module
//!
//! Periodic maintenance work owned by engine instances.

mod cleanup;

pub(crate) use cleanup::spawn_cleanup_task;
