//! # Traversal Stack
//!
//! The ancestors of the field currently being visited. Each frame holds a
//! compound field class and the index of the child being visited below it.
//! A frame's index is unset between its push and the first
//! [`TraversalStack::set_current_index`].

use tsdl_core::{FieldClass, FieldIndex, FieldPath, Scope};

/// One ancestor of the current field.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// The compound ancestor.
    pub fc: &'a FieldClass,
    /// Index of the child being visited, once set.
    pub index: Option<FieldIndex>,
}

/// Stack of [`Frame`]s, outermost first.
#[derive(Debug, Default)]
pub struct TraversalStack<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> TraversalStack<'a> {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `fc` with an unset index.
    pub fn push(&mut self, fc: &'a FieldClass) {
        self.frames.push(Frame { fc, index: None });
    }

    /// Pop the innermost frame.
    pub fn pop(&mut self) -> Option<Frame<'a>> {
        self.frames.pop()
    }

    /// The innermost frame.
    pub fn peek(&self) -> Option<&Frame<'a>> {
        self.frames.last()
    }

    /// Mutable access to the innermost frame.
    pub fn peek_mut(&mut self) -> Option<&mut Frame<'a>> {
        self.frames.last_mut()
    }

    /// Number of frames.
    pub fn size(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame is pushed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame at `depth`, counted from the outermost.
    pub fn at(&self, depth: usize) -> Option<&Frame<'a>> {
        self.frames.get(depth)
    }

    /// All frames, outermost first.
    pub fn frames(&self) -> &[Frame<'a>] {
        &self.frames
    }

    /// Set the innermost frame's child index. No-op on an empty stack.
    pub fn set_current_index(&mut self, index: FieldIndex) {
        if let Some(frame) = self.peek_mut() {
            frame.index = Some(index);
        }
    }

    /// Indices of the frames below `depth`, outermost first.
    pub fn indices_below(&self, depth: usize) -> Vec<FieldIndex> {
        self.frames
            .iter()
            .take(depth)
            .filter_map(|frame| frame.index)
            .collect()
    }

    /// Path of the field currently being visited, rooted at `root`.
    pub fn field_path(&self, root: Scope) -> FieldPath {
        FieldPath::new(root, self.indices_below(self.frames.len()))
    }
}
