//! Graph-form bodies: a function is an ordered list of blocks, each block an
//! ordered list of operations.
//!
//! Graph values are block arguments and operation results. Only
//! `GraphBuilder` mutates block and operation lists.

use smallvec::SmallVec;

use crate::context::IrContext;
use crate::interner::Identifier;
use crate::refs::{AttrRef, BlockRef, GraphFuncRef, GraphValue, OpRef, TypeRef};

/// Where a graph value is defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphValueDef {
    /// Result of an operation at the given index.
    OpResult(OpRef, u32),
    /// Block argument at the given index.
    BlockArg(BlockRef, u32),
}

pub struct GraphValueData {
    pub def: GraphValueDef,
    pub ty: TypeRef,
}

pub struct GraphFunctionData {
    pub name: Identifier,
    pub ty: TypeRef,
    pub blocks: Vec<BlockRef>,
}

pub struct BlockData {
    pub function: GraphFuncRef,
    pub args: SmallVec<[GraphValue; 2]>,
    pub ops: Vec<OpRef>,
}

/// Data for a single operation.
pub struct OperationData {
    pub name: Identifier,
    pub operands: SmallVec<[GraphValue; 4]>,
    pub results: SmallVec<[GraphValue; 2]>,
    pub attributes: SmallVec<[(Identifier, AttrRef); 4]>,
    pub parent_block: BlockRef,
}

impl IrContext {
    // ========================================================================
    // Functions and blocks
    // ========================================================================

    /// Blocks of a graph function, in order.
    pub fn function_blocks(&self, func: GraphFuncRef) -> &[BlockRef] {
        &self.graph_funcs[func].blocks
    }

    pub fn block_function(&self, block: BlockRef) -> GraphFuncRef {
        self.blocks[block].function
    }

    pub fn block_ops(&self, block: BlockRef) -> &[OpRef] {
        &self.blocks[block].ops
    }

    pub fn block_args(&self, block: BlockRef) -> &[GraphValue] {
        &self.blocks[block].args
    }

    pub fn has_block(&self, block: BlockRef) -> bool {
        self.blocks.is_valid(block)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub fn op(&self, op: OpRef) -> &OperationData {
        &self.ops[op]
    }

    pub fn op_name(&self, op: OpRef) -> &str {
        self.resolve_identifier(self.ops[op].name)
    }

    pub fn op_operands(&self, op: OpRef) -> &[GraphValue] {
        &self.ops[op].operands
    }

    pub fn op_results(&self, op: OpRef) -> &[GraphValue] {
        &self.ops[op].results
    }

    pub fn op_result(&self, op: OpRef, index: usize) -> GraphValue {
        self.ops[op].results[index]
    }

    pub fn op_result_types(&self, op: OpRef) -> SmallVec<[TypeRef; 2]> {
        self.ops[op]
            .results
            .iter()
            .map(|&v| self.graph_values[v].ty)
            .collect()
    }

    /// Look up an attribute of `op` by name.
    pub fn op_attr(&self, op: OpRef, name: &str) -> Option<AttrRef> {
        let key = self.lookup_identifier(name)?;
        self.ops[op]
            .attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, attr)| attr)
    }

    // ========================================================================
    // Values
    // ========================================================================

    pub fn has_graph_value(&self, value: GraphValue) -> bool {
        self.graph_values.is_valid(value)
    }

    pub fn graph_value_type(&self, value: GraphValue) -> TypeRef {
        self.graph_values[value].ty
    }

    pub fn graph_value_def(&self, value: GraphValue) -> GraphValueDef {
        self.graph_values[value].def
    }

    // ========================================================================
    // Mutation (GraphBuilder only)
    // ========================================================================

    /// Allocate an empty block at the end of `func`.
    pub(crate) fn append_block(&mut self, func: GraphFuncRef) -> BlockRef {
        let block = self.blocks.push(BlockData {
            function: func,
            args: SmallVec::new(),
            ops: Vec::new(),
        });
        self.graph_funcs[func].blocks.push(block);
        block
    }

    pub(crate) fn push_block_arg(&mut self, block: BlockRef, ty: TypeRef) -> GraphValue {
        let index = self.blocks[block].args.len() as u32;
        let value = self.graph_values.push(GraphValueData {
            def: GraphValueDef::BlockArg(block, index),
            ty,
        });
        self.blocks[block].args.push(value);
        value
    }

    /// Create an operation and splice it into `block` at `index`.
    ///
    /// Operands must already be validated; this cannot fail.
    pub(crate) fn insert_op(
        &mut self,
        block: BlockRef,
        index: usize,
        name: Identifier,
        operands: SmallVec<[GraphValue; 4]>,
        result_types: &[TypeRef],
        attributes: SmallVec<[(Identifier, AttrRef); 4]>,
    ) -> OpRef {
        let op = self.ops.next_key();
        let results = result_types
            .iter()
            .enumerate()
            .map(|(idx, &ty)| {
                self.graph_values.push(GraphValueData {
                    def: GraphValueDef::OpResult(op, idx as u32),
                    ty,
                })
            })
            .collect();
        let pushed = self.ops.push(OperationData {
            name,
            operands,
            results,
            attributes,
            parent_block: block,
        });
        debug_assert_eq!(pushed, op);
        self.blocks[block].ops.insert(index, op);
        op
    }
}
