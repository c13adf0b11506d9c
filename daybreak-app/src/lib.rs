//! The `daybreak` binary's working parts: CLI surface, image picking, and
//! the morning-post pipeline. They live in a lib so the pipeline can be
//! driven end to end from integration tests.

pub mod cli;
pub mod images;
pub mod pipeline;
