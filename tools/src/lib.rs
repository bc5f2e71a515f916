//! Shared pieces of the `smp` and `strategy-server` binaries.

pub mod terminal;
