//! A block graph view over one pipeline or composite block type body.

use std::collections::HashSet;

use crate::ast::{BlockId, BlockTypeId, Container, Model, PipeId, PipelineId, Span};

use super::PipeWrapper;

/// The blocks and edges of one body.
///
/// Edges are built once on construction; pairs with an unlinked endpoint
/// are left out, so queries only ever see resolved blocks.
#[derive(Debug, Clone)]
pub struct PipelineWrapper<'m> {
    model: &'m Model,
    container: Container,
    blocks: &'m [BlockId],
    pipes: Vec<PipeWrapper>,
}

impl<'m> PipelineWrapper<'m> {
    pub fn for_pipeline(model: &'m Model, id: PipelineId) -> Option<Self> {
        let pipeline = model.pipeline(id)?;
        Some(Self::build(
            model,
            Container::Pipeline(id),
            &pipeline.blocks,
            &pipeline.pipes,
        ))
    }

    pub fn for_composite(model: &'m Model, id: BlockTypeId) -> Option<Self> {
        let block_type = model.block_type(id)?;
        Some(Self::build(
            model,
            Container::Composite(id),
            &block_type.blocks,
            &block_type.pipes,
        ))
    }

    pub fn for_container(model: &'m Model, container: Container) -> Option<Self> {
        match container {
            Container::Pipeline(id) => Self::for_pipeline(model, id),
            Container::Composite(id) => Self::for_composite(model, id),
        }
    }

    fn build(
        model: &'m Model,
        container: Container,
        blocks: &'m [BlockId],
        pipe_ids: &[PipeId],
    ) -> Self {
        let pipes = pipe_ids
            .iter()
            .flat_map(|pipe| PipeWrapper::from_pipe(model, *pipe))
            .collect();
        Self {
            model,
            container,
            blocks,
            pipes,
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Span of the pipeline or composite block type name
    pub fn name_span(&self) -> Span {
        match self.container {
            Container::Pipeline(id) => self.model.pipeline(id).map(|p| p.name_span),
            Container::Composite(id) => self.model.block_type(id).map(|t| t.name_span),
        }
        .unwrap_or_default()
    }

    /// Blocks declared in the body, in source order
    pub fn blocks(&self) -> &'m [BlockId] {
        self.blocks
    }

    /// All edges, in source order
    pub fn pipes(&self) -> &[PipeWrapper] {
        &self.pipes
    }

    /// Blocks that never end an edge, in source order and each listed once.
    ///
    /// Blocks without any pipe count too; only a body in which every block
    /// is fed by a pipe (a pure cycle) has none.
    pub fn starting_blocks(&self) -> Vec<BlockId> {
        let mut starting = Vec::new();
        for &block in self.blocks {
            if !starting.contains(&block) && self.pipes.iter().all(|p| p.to != block) {
                starting.push(block);
            }
        }
        starting
    }

    pub fn ingoing_pipes(&self, block: BlockId) -> Vec<PipeWrapper> {
        self.pipes.iter().filter(|p| p.to == block).copied().collect()
    }

    pub fn outgoing_pipes(&self, block: BlockId) -> Vec<PipeWrapper> {
        self.pipes.iter().filter(|p| p.from == block).copied().collect()
    }

    pub fn parent_blocks(&self, block: BlockId) -> Vec<BlockId> {
        self.ingoing_pipes(block).into_iter().map(|p| p.from).collect()
    }

    pub fn child_blocks(&self, block: BlockId) -> Vec<BlockId> {
        self.outgoing_pipes(block).into_iter().map(|p| p.to).collect()
    }

    /// Whether any edge touches `block`
    pub fn is_connected(&self, block: BlockId) -> bool {
        self.pipes.iter().any(|p| p.from == block || p.to == block)
    }

    /// Ingoing edges of every block that has more than one, as reached by a
    /// depth-first walk from each starting block.
    ///
    /// An edge is reported once even if several walks reach its block.
    pub fn multiple_input_edges(&self) -> Vec<PipeWrapper> {
        let mut reported: HashSet<(BlockId, BlockId)> = HashSet::new();
        let mut traversed: HashSet<(BlockId, BlockId)> = HashSet::new();
        let mut found = Vec::new();

        for start in self.starting_blocks() {
            let mut stack = vec![start];
            while let Some(block) = stack.pop() {
                let ingoing = self.ingoing_pipes(block);
                if ingoing.len() > 1 {
                    for pipe in ingoing {
                        if reported.insert((pipe.from, pipe.to)) {
                            found.push(pipe);
                        }
                    }
                }
                for pipe in self.outgoing_pipes(block) {
                    if traversed.insert((pipe.from, pipe.to)) {
                        stack.push(pipe.to);
                    }
                }
            }
        }
        found
    }

    /// Edges closing a cycle.
    ///
    /// Each edge is traversed at most once; an edge leading back onto the
    /// current walk is reported.
    pub fn find_cycles(&self) -> Vec<PipeWrapper> {
        let mut traversed: HashSet<(BlockId, BlockId)> = HashSet::new();
        let mut finished: HashSet<BlockId> = HashSet::new();
        let mut back_edges = Vec::new();

        let mut roots: Vec<BlockId> = Vec::new();
        for pipe in &self.pipes {
            if !roots.contains(&pipe.from) {
                roots.push(pipe.from);
            }
        }
        for root in roots {
            if finished.contains(&root) {
                continue;
            }
            let mut on_path = Vec::new();
            self.walk_for_cycles(
                root,
                &mut on_path,
                &mut traversed,
                &mut finished,
                &mut back_edges,
            );
        }
        back_edges
    }

    fn walk_for_cycles(
        &self,
        block: BlockId,
        on_path: &mut Vec<BlockId>,
        traversed: &mut HashSet<(BlockId, BlockId)>,
        finished: &mut HashSet<BlockId>,
        back_edges: &mut Vec<PipeWrapper>,
    ) {
        on_path.push(block);
        for pipe in self.outgoing_pipes(block) {
            if !traversed.insert((pipe.from, pipe.to)) {
                continue;
            }
            if on_path.contains(&pipe.to) {
                back_edges.push(pipe);
            } else if !finished.contains(&pipe.to) {
                self.walk_for_cycles(pipe.to, on_path, traversed, finished, back_edges);
            }
        }
        on_path.pop();
        finished.insert(block);
    }
}
