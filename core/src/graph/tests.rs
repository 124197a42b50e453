//! Tests for the pipe and pipeline graph

use super::*;
use crate::ast::{BlockId, Model, PipelineId};
use crate::test_helpers::ModelBuilder;

// ============================================================================
// Helper Functions
// ============================================================================

/// One pipeline named "P" with the given blocks, all of one block type
fn pipeline_with(blocks: &[&str], pipes: impl FnOnce(&mut ModelBuilder)) -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    builder.pipeline("P");
    for name in blocks {
        builder.block(name, "TextFileInterpreter", vec![]);
    }
    pipes(&mut builder);
    builder
}

fn block_named(model: &Model, name: &str) -> BlockId {
    model
        .block_ids()
        .find(|id| model.block(*id).map(|b| b.name.as_str()) == Some(name))
        .expect("block should exist")
}

fn names(model: &Model, blocks: &[BlockId]) -> Vec<String> {
    blocks
        .iter()
        .map(|id| model.block(*id).expect("block should exist").name.clone())
        .collect()
}

// ============================================================================
// Pipe Wrapper Tests
// ============================================================================

#[test]
fn test_single_pipe_is_one_edge() {
    let model = pipeline_with(&["A", "B"], |b| {
        b.pipe("A", "B");
    })
    .linked();

    let edges = PipeWrapper::from_pipe(&model, crate::ast::PipeId(0));
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].hop, 0);
    assert_eq!(edges[0].from, block_named(&model, "A"));
    assert_eq!(edges[0].to, block_named(&model, "B"));
    assert_ne!(edges[0].from_span, edges[0].to_span);
}

#[test]
fn test_chain_is_one_edge_per_arrow() {
    let model = pipeline_with(&["A", "B", "C"], |b| {
        b.chain(&["A", "B", "C"]);
    })
    .linked();

    let edges = PipeWrapper::from_pipe(&model, crate::ast::PipeId(0));
    let hops: Vec<usize> = edges.iter().map(|e| e.hop).collect();
    assert_eq!(hops, vec![0, 1]);
    assert!(edges[0].connects_same_blocks(&PipeWrapper {
        hop: 7,
        ..edges[0]
    }));
    assert!(!edges[0].connects_same_blocks(&edges[1]));
}

#[test]
fn test_chain_with_unlinked_block_has_no_edges_touching_it() {
    let (model, diagnostics) = pipeline_with(&["A", "C"], |b| {
        b.chain(&["A", "B", "C"]);
    })
    .link();
    assert_eq!(diagnostics.len(), 1);

    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();
    assert!(pipeline.pipes().is_empty());
    assert!(!PipeWrapper::can_be_wrapped(&model, crate::ast::PipeId(0), 0));
    assert!(!PipeWrapper::can_be_wrapped(&model, crate::ast::PipeId(0), 1));
    assert!(PipeWrapper::wrap(&model, crate::ast::PipeId(0), 2).is_err());
}

#[test]
fn test_partially_linked_chain_keeps_intact_pairs() {
    let (model, _) = pipeline_with(&["A", "B", "D"], |b| {
        b.chain(&["A", "B", "C", "D"]);
    })
    .link();

    let edges = PipeWrapper::from_pipe(&model, crate::ast::PipeId(0));
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].hop, 0);
}

// ============================================================================
// Pipeline Wrapper Tests
// ============================================================================

#[test]
fn test_parents_and_children() {
    let model = pipeline_with(&["A", "B", "C"], |b| {
        b.chain(&["A", "B"]);
        b.pipe("B", "C");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();
    let b = block_named(&model, "B");

    assert_eq!(names(&model, &pipeline.parent_blocks(b)), vec!["A"]);
    assert_eq!(names(&model, &pipeline.child_blocks(b)), vec!["C"]);
    assert_eq!(pipeline.ingoing_pipes(b).len(), 1);
    assert_eq!(pipeline.outgoing_pipes(b).len(), 1);
    assert_eq!(names(&model, &pipeline.starting_blocks()), vec!["A"]);
}

#[test]
fn test_starting_blocks_are_deduplicated() {
    let model = pipeline_with(&["A", "B", "C"], |b| {
        b.pipe("A", "B");
        b.pipe("A", "C");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert_eq!(names(&model, &pipeline.starting_blocks()), vec!["A"]);
}

#[test]
fn test_lone_block_is_its_own_start() {
    let model = pipeline_with(&["Only"], |_| {}).linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert_eq!(names(&model, &pipeline.starting_blocks()), vec!["Only"]);
}

#[test]
fn test_unconnected_blocks_are_starting_blocks() {
    let model = pipeline_with(&["A", "B"], |_| {}).linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert_eq!(names(&model, &pipeline.starting_blocks()), vec!["A", "B"]);
    assert!(!pipeline.is_connected(block_named(&model, "A")));
}

#[test]
fn test_every_block_without_ingoing_pipe_starts() {
    let model = pipeline_with(&["A", "B", "C", "D"], |b| {
        b.pipe("C", "D");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert_eq!(
        names(&model, &pipeline.starting_blocks()),
        vec!["A", "B", "C"]
    );
}

#[test]
fn test_multiple_input_edges_reported_once() {
    let model = pipeline_with(&["X", "Y", "Z", "W"], |b| {
        b.pipe("X", "Z");
        b.pipe("Y", "Z");
        b.pipe("Z", "W");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    let edges = pipeline.multiple_input_edges();
    assert_eq!(edges.len(), 2);
    let z = block_named(&model, "Z");
    assert!(edges.iter().all(|e| e.to == z));
}

#[test]
fn test_cycle_back_edge_reported() {
    let model = pipeline_with(&["S", "A", "B", "C"], |b| {
        b.chain(&["S", "A", "B", "C"]);
        b.pipe("C", "A");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    let cycles = pipeline.find_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].from, block_named(&model, "C"));
    assert_eq!(cycles[0].to, block_named(&model, "A"));
}

#[test]
fn test_pure_cycle_has_no_start() {
    let model = pipeline_with(&["A", "B"], |b| {
        b.chain(&["A", "B", "A"]);
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert!(pipeline.starting_blocks().is_empty());
    assert_eq!(pipeline.find_cycles().len(), 1);
    // the walk terminates even though nothing starts it
    assert!(pipeline.multiple_input_edges().is_empty());
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let model = pipeline_with(&["A", "B", "C", "D"], |b| {
        b.pipe("A", "B");
        b.pipe("A", "C");
        b.pipe("B", "D");
        b.pipe("C", "D");
    })
    .linked();
    let pipeline = PipelineWrapper::for_pipeline(&model, PipelineId(0)).unwrap();

    assert!(pipeline.find_cycles().is_empty());
    assert_eq!(pipeline.multiple_input_edges().len(), 2);
}

#[test]
fn test_composite_body_is_a_graph() {
    let mut builder = ModelBuilder::new();
    let composite = builder.composite("Pair", Some("File"), Some("Table"), vec![]);
    builder.block("Interpreter", "TextFileInterpreter", vec![]);
    builder.block("Table", "CSVInterpreter", vec![]);
    builder.pipe("Interpreter", "Table");
    let model = builder.linked();

    let body = PipelineWrapper::for_composite(&model, composite).unwrap();
    assert_eq!(body.blocks().len(), 2);
    assert_eq!(body.pipes().len(), 1);
    assert_eq!(names(&model, &body.starting_blocks()), vec!["Interpreter"]);
    assert!(PipelineWrapper::for_pipeline(&model, PipelineId(0)).is_none());
}
