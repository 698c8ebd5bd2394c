//! Library surface of the `diarisk` binary, shared with its tests.

pub mod config;
pub mod logging;
pub mod pipeline;
