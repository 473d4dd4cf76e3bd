//! Values of the two body representations.
//!
//! Graph-form and tree-form values are distinct entity types. Code that accepts
//! values of either form takes a `Value`, and narrows it with a `BodyForm`
//! before linking it into a body. Narrowing is total: it either yields a value
//! of the requested form or `None`.

use std::fmt;

use derive_more::{Display, From};

use crate::context::IrContext;
use crate::refs::{GraphValue, TreeValue};

/// Which body representation a value or node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum BodyKind {
    #[display("graph")]
    Graph,
    #[display("tree")]
    Tree,
}

/// A value produced by either body representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From)]
pub enum Value {
    #[display("{_0}")]
    Graph(GraphValue),
    #[display("{_0}")]
    Tree(TreeValue),
}

impl Value {
    pub fn kind(self) -> BodyKind {
        match self {
            Value::Graph(_) => BodyKind::Graph,
            Value::Tree(_) => BodyKind::Tree,
        }
    }

    pub fn as_graph(self) -> Option<GraphValue> {
        Graph::narrow(self)
    }

    pub fn as_tree(self) -> Option<TreeValue> {
        Tree::narrow(self)
    }
}

/// A body representation, used as a type-level tag by the creation routines.
pub trait BodyForm {
    /// Value type produced and consumed by nodes of this form.
    type Value: Copy + fmt::Display;

    const KIND: BodyKind;

    /// Narrow a generic value to this form.
    fn narrow(value: Value) -> Option<Self::Value>;

    /// Whether `value` names a value allocated in `ctx`.
    fn is_live(ctx: &IrContext, value: Self::Value) -> bool;
}

/// Tag for graph-form bodies (blocks of operations).
pub enum Graph {}

/// Tag for tree-form bodies (nested statement lists).
pub enum Tree {}

impl BodyForm for Graph {
    type Value = GraphValue;

    const KIND: BodyKind = BodyKind::Graph;

    fn narrow(value: Value) -> Option<GraphValue> {
        match value {
            Value::Graph(v) => Some(v),
            Value::Tree(_) => None,
        }
    }

    fn is_live(ctx: &IrContext, value: GraphValue) -> bool {
        ctx.has_graph_value(value)
    }
}

impl BodyForm for Tree {
    type Value = TreeValue;

    const KIND: BodyKind = BodyKind::Tree;

    fn narrow(value: Value) -> Option<TreeValue> {
        match value {
            Value::Tree(v) => Some(v),
            Value::Graph(_) => None,
        }
    }

    fn is_live(ctx: &IrContext, value: TreeValue) -> bool {
        ctx.has_tree_value(value)
    }
}
