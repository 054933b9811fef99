//! Synchronization helpers: shared counters and one-time initialization.

pub mod counter;
pub mod init;

pub use counter::SharedCounter;
pub use init::{InitCell, InitState};
