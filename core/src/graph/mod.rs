//! Pipe and pipeline graph queries.
//!
//! A pipe statement is flattened into [`PipeWrapper`] edges, one per
//! connected block pair, and a [`PipelineWrapper`] answers graph questions
//! (starting blocks, parents, children, cycles) over the edges of one body.
//! The same view is used for pipelines and for composite block type bodies.

mod pipe;
mod pipeline;

#[cfg(test)]
mod tests;

pub use pipe::PipeWrapper;
pub use pipeline::PipelineWrapper;
