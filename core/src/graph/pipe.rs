//! Pipe wrappers: one directed edge per linked endpoint pair.

use crate::ast::{BlockId, Model, PipeDefinition, PipeId, Reference, Span};
use crate::error::WrapError;

/// One edge between two blocks.
///
/// `hop` is the position of the pair inside the pipe statement: always 0
/// for `pipe { from: A; to: B; }`, and `i` for the `i`-th arrow of a chain.
/// The endpoint spans point at the two names as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeWrapper {
    pub from: BlockId,
    pub to: BlockId,
    pub pipe: PipeId,
    pub hop: usize,
    pub from_span: Span,
    pub to_span: Span,
}

impl PipeWrapper {
    /// Whether hop `hop` of `pipe` exists and both of its endpoints are linked
    pub fn can_be_wrapped(model: &Model, pipe: PipeId, hop: usize) -> bool {
        endpoint_pair(model, pipe, hop)
            .is_some_and(|(from, to)| from.is_resolved() && to.is_resolved())
    }

    pub fn wrap(model: &Model, pipe: PipeId, hop: usize) -> Result<Self, WrapError> {
        let (from, to) = endpoint_pair(model, pipe, hop).ok_or_else(|| WrapError::Incomplete {
            kind: "pipe",
            reason: format!("pipe {} has no hop {}", pipe, hop),
        })?;
        match (from.get(), to.get()) {
            (Some(from_block), Some(to_block)) => Ok(Self {
                from: from_block,
                to: to_block,
                pipe,
                hop,
                from_span: from.span,
                to_span: to.span,
            }),
            _ => Err(WrapError::Incomplete {
                kind: "pipe",
                reason: format!("an endpoint of {} -> {} is unresolved", from.name, to.name),
            }),
        }
    }

    /// All edges of one pipe statement.
    ///
    /// A pair with an unlinked endpoint is skipped on its own; the other
    /// hops of a chain are still produced.
    pub fn from_pipe(model: &Model, pipe: PipeId) -> Vec<PipeWrapper> {
        let hops = match model.pipe(pipe) {
            Some(definition) => definition.endpoints().len().saturating_sub(1),
            None => 0,
        };
        (0..hops)
            .filter_map(|hop| PipeWrapper::wrap(model, pipe, hop).ok())
            .collect()
    }

    /// Same `from` and `to`, regardless of syntax
    pub fn connects_same_blocks(&self, other: &PipeWrapper) -> bool {
        self.from == other.from && self.to == other.to
    }
}

fn endpoint_pair(
    model: &Model,
    pipe: PipeId,
    hop: usize,
) -> Option<(&Reference<BlockId>, &Reference<BlockId>)> {
    match model.pipe(pipe)? {
        PipeDefinition::Single { from, to, .. } => (hop == 0).then_some((from, to)),
        PipeDefinition::Chain { blocks, .. } => {
            Some((blocks.get(hop)?, blocks.get(hop.checked_add(1)?)?))
        }
    }
}
