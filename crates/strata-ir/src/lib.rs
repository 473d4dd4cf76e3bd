//! Strata IR construction layer.
//!
//! An `IrContext` owns every IR value of one compilation. Types, attributes,
//! affine expressions, affine maps and integer sets are hash-consed, so two
//! refs compare equal exactly when their structures do. Function bodies come
//! in two forms: graph functions (blocks of operations over SSA values) and
//! tree functions (nested statement lists with affine loops). Each form is
//! populated through its own cursor builder, and an operand from the other
//! form is rejected at creation time.

// === Handles and storage ===
pub mod interner;
pub mod refs;

// === Interned values ===
pub mod affine;
pub mod attributes;
pub mod types;

// === Context and bodies ===
pub mod context;
pub mod graph;
pub mod tree;
pub mod value;

// === Construction ===
pub mod builder;
pub mod error;
pub mod state;

// Re-export smallvec for callers building operand lists
pub use smallvec;

pub use affine::{AffineBinaryKind, AffineExprData, AffineMapData, IntegerSetData};
pub use attributes::AttributeData;
pub use builder::{
    Builder, GraphBuilder, GraphInsertPoint, TreeBuilder, TreeInsertPoint, ValueFactory,
};
pub use context::IrContext;
pub use error::{IrError, IrResult};
pub use graph::GraphValueDef;
pub use interner::Identifier;
pub use refs::{
    AffineExprRef, AffineMapRef, AttrRef, BlockRef, FuncRef, GraphFuncRef, GraphValue,
    IntegerSetRef, OpRef, StmtListRef, StmtRef, TreeFuncRef, TreeValue, TypeRef,
};
pub use state::OperationState;
pub use tree::{StmtListParent, TreeValueDef};
pub use types::{FloatKind, TypeData};
pub use value::{BodyKind, Value};
