//! Entity references.
//!
//! Each ref type is a thin `u32` wrapper providing type-safe indexing
//! into `PrimaryMap` storage in `IrContext`. Refs are only meaningful for the
//! context that issued them.

use cranelift_entity::entity_impl;
use derive_more::{Display, From};

// ============================================================================
// Interned values
// ============================================================================

/// Reference to an interned type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);
entity_impl!(TypeRef, "ty");

/// Reference to an interned attribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrRef(u32);
entity_impl!(AttrRef, "attr");

/// Reference to an interned affine expression.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffineExprRef(u32);
entity_impl!(AffineExprRef, "aexpr");

/// Reference to an interned affine map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffineMapRef(u32);
entity_impl!(AffineMapRef, "amap");

/// Reference to an interned integer set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntegerSetRef(u32);
entity_impl!(IntegerSetRef, "iset");

// ============================================================================
// Graph-form body
// ============================================================================

/// Reference to a function whose body is a list of blocks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphFuncRef(u32);
entity_impl!(GraphFuncRef, "gfn");

/// Reference to a basic block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(u32);
entity_impl!(BlockRef, "block");

/// Reference to an operation inside a block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpRef(u32);
entity_impl!(OpRef, "op");

/// Reference to a value produced inside a graph-form body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphValue(u32);
entity_impl!(GraphValue, "%g");

// ============================================================================
// Tree-form body
// ============================================================================

/// Reference to a function whose body is a nested statement list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeFuncRef(u32);
entity_impl!(TreeFuncRef, "tfn");

/// Reference to an ordered statement list (a function body or a loop body).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtListRef(u32);
entity_impl!(StmtListRef, "stmts");

/// Reference to a statement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtRef(u32);
entity_impl!(StmtRef, "stmt");

/// Reference to a value produced inside a tree-form body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeValue(u32);
entity_impl!(TreeValue, "%t");

/// A function of either body form, as referenced by a function attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From)]
pub enum FuncRef {
    #[display("{_0}")]
    Graph(GraphFuncRef),
    #[display("{_0}")]
    Tree(TreeFuncRef),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;

    #[test]
    fn entity_ref_display() {
        assert_eq!(format!("{}", TypeRef::new(3)), "ty3");
        assert_eq!(format!("{}", AffineExprRef::new(0)), "aexpr0");
        assert_eq!(format!("{}", BlockRef::new(2)), "block2");
        assert_eq!(format!("{}", GraphValue::new(5)), "%g5");
        assert_eq!(format!("{}", TreeValue::new(1)), "%t1");
        assert_eq!(format!("{}", StmtListRef::new(4)), "stmts4");
    }

    #[test]
    fn func_ref_display_follows_variant() {
        assert_eq!(FuncRef::from(GraphFuncRef::new(1)).to_string(), "gfn1");
        assert_eq!(FuncRef::from(TreeFuncRef::new(0)).to_string(), "tfn0");
    }
}
