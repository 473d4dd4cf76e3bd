//! Affine expressions, affine maps, and integer sets.
//!
//! Binary expression nodes refer to their operands by `AffineExprRef`, so an
//! expression tree is interned bottom-up and structurally identical trees
//! collapse to one node.

use derive_more::Display;
use smallvec::SmallVec;

use crate::refs::AffineExprRef;

/// Binary operators of affine expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum AffineBinaryKind {
    #[display("add")]
    Add,
    #[display("mul")]
    Mul,
    #[display("mod")]
    Mod,
    #[display("floordiv")]
    FloorDiv,
    #[display("ceildiv")]
    CeilDiv,
}

/// Data for a single interned affine expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffineExprData {
    Dim(u32),
    Symbol(u32),
    Constant(i64),
    Binary {
        kind: AffineBinaryKind,
        lhs: AffineExprRef,
        rhs: AffineExprRef,
    },
}

impl AffineExprData {
    pub fn as_constant(&self) -> Option<i64> {
        match self {
            AffineExprData::Constant(value) => Some(*value),
            _ => None,
        }
    }
}

/// Data for a single interned affine map.
///
/// `range_sizes` is either empty or holds one size expression per result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AffineMapData {
    pub dim_count: u32,
    pub symbol_count: u32,
    pub results: SmallVec<[AffineExprRef; 4]>,
    pub range_sizes: SmallVec<[AffineExprRef; 4]>,
}

impl AffineMapData {
    pub fn is_bounded(&self) -> bool {
        !self.range_sizes.is_empty()
    }
}

/// Data for a single interned integer set.
///
/// Constraint `i` reads `constraints[i] == 0` when `eq_flags[i]` is set and
/// `constraints[i] >= 0` otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegerSetData {
    pub dim_count: u32,
    pub symbol_count: u32,
    pub constraints: SmallVec<[AffineExprRef; 4]>,
    pub eq_flags: SmallVec<[bool; 4]>,
}

impl IntegerSetData {
    pub fn num_equalities(&self) -> usize {
        self.eq_flags.iter().filter(|&&eq| eq).count()
    }

    pub fn num_inequalities(&self) -> usize {
        self.eq_flags.len() - self.num_equalities()
    }
}
