//! Rooted trees.
//!
//! A [`Tree`] is a value with an ordered list of subtrees. The simulator works
//! on `Tree<Node>`, where each node carries a label and the length of the
//! branch leading to it. Leaf order is the pre-order, left-to-right
//! enumeration of the tree, and every output that lists leaves uses it.

use std::collections::HashSet;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::errors::TreeError;

/// A rooted tree with values of type `T` at every node.
///
/// Traversals, cloning, comparison and drop use an explicit stack, so
/// arbitrarily deep trees are safe. `Debug` and serialization recurse;
/// JSON input is limited by serde_json's nesting limit.
#[derive(Debug, Serialize, Deserialize)]
pub struct Tree<T> {
    pub value: T,
    #[serde(default)]
    pub children: Vec<Tree<T>>,
}

/// Label and branch length of a node.
///
/// The branch length of the root is ignored by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub branch_length: f64,
}

impl Node {
    pub fn new(label: impl Into<String>, branch_length: f64) -> Self {
        Self {
            label: label.into(),
            branch_length,
        }
    }
}

/// Pre-order iterator over the subtrees of a [`Tree`].
pub struct Preorder<'a, T> {
    stack: Vec<&'a Tree<T>>,
}

impl<'a, T> Iterator for Preorder<'a, T> {
    type Item = &'a Tree<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<T> Tree<T> {
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn node(value: T, children: Vec<Tree<T>>) -> Self {
        Self { value, children }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Every subtree, root first, in pre-order.
    pub fn iter(&self) -> Preorder<'_, T> {
        Preorder { stack: vec![self] }
    }

    /// Leaf values in pre-order, left to right.
    pub fn leaves(&self) -> Vec<&T> {
        self.iter().filter(|t| t.is_leaf()).map(|t| &t.value).collect()
    }

    /// Number of nodes, including the root.
    pub fn n_nodes(&self) -> usize {
        self.iter().count()
    }

    pub fn n_leaves(&self) -> usize {
        self.iter().filter(|t| t.is_leaf()).count()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Tree of the same shape with `f` applied to every value.
    ///
    /// `f` is called in pre-order.
    pub fn map<U, F>(&self, mut f: F) -> Tree<U>
    where
        F: FnMut(&T) -> U,
    {
        match self.try_map(|v| Ok::<U, Infallible>(f(v))) {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Like [`Tree::map`], stopping at the first error.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<Tree<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        let root = f(&self.value)?;
        let nodes: Vec<&Tree<T>> = self.iter().skip(1).collect();
        let values = nodes
            .iter()
            .map(|node| f(&node.value))
            .collect::<Result<Vec<U>, E>>()?;

        // In reverse pre-order, the subtrees of a node's children sit on top
        // of `built`, first child topmost.
        let mut built: Vec<Tree<U>> = Vec::new();
        for (node, value) in nodes.iter().zip(values).rev() {
            let mut children = built.split_off(built.len() - node.children.len());
            children.reverse();
            built.push(Tree::node(value, children));
        }
        built.reverse();
        Ok(Tree::node(root, built))
    }
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        self.map(T::clone)
    }
}

impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Tree<Node> {
    /// Leaf labels in leaf order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves().into_iter().map(|n| n.label.as_str()).collect()
    }

    /// Sum of all branch lengths below the root.
    pub fn total_length(&self) -> f64 {
        self.iter().skip(1).map(|t| t.value.branch_length).sum()
    }

    /// Check branch lengths and leaf names.
    ///
    /// # Errors
    /// - [`TreeError::InvalidBranchLength`] for a negative or non-finite
    ///   branch length on any non-root node.
    /// - [`TreeError::EmptyLeafName`] for a leaf without a label.
    /// - [`TreeError::DuplicateLeafName`] if two leaves share a label.
    pub fn validate(&self) -> Result<(), TreeError> {
        for node in self.iter().skip(1) {
            let length = node.value.branch_length;
            if !length.is_finite() || length < 0.0 {
                return Err(TreeError::InvalidBranchLength {
                    label: node.value.label.clone(),
                    length,
                });
            }
        }
        let mut seen = HashSet::new();
        for (i, name) in self.leaf_names().into_iter().enumerate() {
            if name.is_empty() {
                return Err(TreeError::EmptyLeafName(i));
            }
            if !seen.insert(name) {
                return Err(TreeError::DuplicateLeafName(name.to_string()));
            }
        }
        Ok(())
    }
}
