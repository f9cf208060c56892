//! Incremental construction of a [`SyntaxTree`].

use crate::{NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree, Token};
use std::sync::Arc;

/// A position in the builder's current child list, used to wrap nodes that
/// were already emitted into a new parent (left-recursive expressions).
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    depth: usize,
    index: usize,
}

struct Frame {
    kind: SyntaxKind,
    children: Vec<NodeId>,
}

/// Builds a tree from a stream of start/token/finish events.
pub struct TreeBuilder {
    source: Arc<str>,
    nodes: Vec<SyntaxNode>,
    stack: Vec<Frame>,
    roots: Vec<NodeId>,
    last_end: usize,
}

impl TreeBuilder {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            stack: Vec::new(),
            roots: Vec::new(),
            last_end: 0,
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    /// Starts a node that adopts every child emitted since `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let adopted = match self.current_children_mut(checkpoint.depth) {
            Some(children) if checkpoint.index <= children.len() => {
                children.split_off(checkpoint.index)
            }
            _ => Vec::new(),
        };
        self.stack.push(Frame {
            kind,
            children: adopted,
        });
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let depth = self.stack.len();
        let index = match self.stack.last() {
            Some(frame) => frame.children.len(),
            None => self.roots.len(),
        };
        Checkpoint { depth, index }
    }

    /// Pushes a token leaf into the current node.
    pub fn token(&mut self, token: Token) {
        self.last_end = token.span.end;
        let id = self.push(SyntaxNode {
            kind: SyntaxKind::Token,
            span: token.span,
            parent: None,
            children: Vec::new(),
            token: Some(token.kind),
        });
        self.attach(id);
    }

    pub fn finish_node(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let span = match (frame.children.first(), frame.children.last()) {
            (Some(first), Some(last)) => {
                self.nodes[first.index()].span.merge(self.nodes[last.index()].span)
            }
            _ => Span::new(self.last_end, self.last_end),
        };
        let id = self.push(SyntaxNode {
            kind: frame.kind,
            span,
            parent: None,
            children: frame.children,
            token: None,
        });
        let children = self.nodes[id.index()].children.clone();
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.attach(id);
    }

    /// Completes the tree. Unfinished nodes are closed; several top-level
    /// nodes are wrapped in a `File` node.
    pub fn finish(mut self) -> SyntaxTree {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        let root = if self.roots.len() == 1 {
            self.roots[0]
        } else {
            self.stack.push(Frame {
                kind: SyntaxKind::File,
                children: std::mem::take(&mut self.roots),
            });
            self.finish_node();
            self.roots[0]
        };
        SyntaxTree::from_parts(self.nodes, root, self.source)
    }

    fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, id: NodeId) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(id),
            None => self.roots.push(id),
        }
    }

    fn current_children_mut(&mut self, depth: usize) -> Option<&mut Vec<NodeId>> {
        if depth == 0 {
            Some(&mut self.roots)
        } else {
            self.stack.get_mut(depth - 1).map(|f| &mut f.children)
        }
    }
}
