//! Cursor builder for graph-form functions.

use crate::context::IrContext;
use crate::error::{IrError, IrResult};
use crate::refs::{BlockRef, GraphFuncRef, GraphValue, OpRef, TypeRef};
use crate::state::OperationState;
use crate::value::Graph;

use super::ValueFactory;

/// Position between two operations of a block.
///
/// `index` is the number of operations before the cursor, so `0` is the start
/// of the block and `block_ops(block).len()` is the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphInsertPoint {
    pub block: BlockRef,
    pub index: usize,
}

/// Creates blocks and operations in one graph-form function.
///
/// The cursor only moves through `set_insertion_point*` and `create_block`;
/// creating an operation leaves it where it was, so consecutive operations
/// created without moving the cursor appear in reverse creation order.
pub struct GraphBuilder<'a> {
    ctx: &'a mut IrContext,
    function: GraphFuncRef,
    cursor: Option<GraphInsertPoint>,
}

impl<'a> GraphBuilder<'a> {
    /// Bind a builder to `function`, with the cursor at the end of its last
    /// block (or unset when the function has no blocks yet).
    pub fn new(ctx: &'a mut IrContext, function: GraphFuncRef) -> Self {
        let cursor = ctx
            .function_blocks(function)
            .last()
            .map(|&block| GraphInsertPoint {
                block,
                index: ctx.block_ops(block).len(),
            });
        Self {
            ctx,
            function,
            cursor,
        }
    }

    pub fn function(&self) -> GraphFuncRef {
        self.function
    }

    pub fn insertion_point(&self) -> Option<GraphInsertPoint> {
        self.cursor
    }

    /// Move the cursor to `index` within `block`.
    pub fn set_insertion_point(&mut self, block: BlockRef, index: usize) -> IrResult<()> {
        if !self.ctx.has_block(block) || self.ctx.block_function(block) != self.function {
            return Err(IrError::invalid_cursor(format_args!(
                "{block} does not belong to {}",
                self.function
            )));
        }
        let len = self.ctx.block_ops(block).len();
        if index > len {
            return Err(IrError::invalid_cursor(format_args!(
                "position {index} is past the end of {block} ({len} operation(s))"
            )));
        }
        tracing::debug!(%block, index, "moved graph insertion point");
        self.cursor = Some(GraphInsertPoint { block, index });
        Ok(())
    }

    pub fn set_insertion_point_to_start(&mut self, block: BlockRef) -> IrResult<()> {
        self.set_insertion_point(block, 0)
    }

    pub fn set_insertion_point_to_end(&mut self, block: BlockRef) -> IrResult<()> {
        let len = if self.ctx.has_block(block) {
            self.ctx.block_ops(block).len()
        } else {
            0
        };
        self.set_insertion_point(block, len)
    }

    /// Append a new block to the function and move the cursor to its start.
    pub fn create_block(&mut self) -> BlockRef {
        let block = self.ctx.append_block(self.function);
        self.cursor = Some(GraphInsertPoint { block, index: 0 });
        tracing::debug!(function = %self.function, %block, "created block");
        block
    }

    /// Append an argument of type `ty` to `block`.
    pub fn add_block_argument(&mut self, block: BlockRef, ty: TypeRef) -> IrResult<GraphValue> {
        if !self.ctx.has_block(block) || self.ctx.block_function(block) != self.function {
            return Err(IrError::invalid_cursor(format_args!(
                "{block} does not belong to {}",
                self.function
            )));
        }
        if !self.ctx.has_type(ty) {
            return Err(IrError::malformed(format_args!(
                "block argument type {ty} is not a type of this context"
            )));
        }
        let value = self.ctx.push_block_arg(block, ty);
        tracing::debug!(%block, %value, "added block argument");
        Ok(value)
    }

    /// Create an operation from `state` and splice it in at the cursor.
    ///
    /// Every operand must be a graph value of this context, and every result
    /// type and attribute must come from this context. On failure the body is
    /// left untouched.
    pub fn create_operation(&mut self, state: OperationState) -> IrResult<OpRef> {
        let point = self.cursor.ok_or(IrError::NoInsertionPoint)?;
        let checked = state.narrow_operands::<Graph>(self.ctx).and_then(|operands| {
            state.check_refs(self.ctx)?;
            Ok(operands)
        });
        let operands = match checked {
            Ok(operands) => operands,
            Err(err) => {
                tracing::debug!(name = %state.name, %err, "rejected graph operation");
                return Err(err);
            }
        };
        let (name, attributes) = state.intern_names(self.ctx);
        let op = self.ctx.insert_op(
            point.block,
            point.index,
            name,
            operands,
            &state.result_types,
            attributes,
        );
        tracing::debug!(
            name = %state.name,
            %op,
            block = %point.block,
            index = point.index,
            "created operation"
        );
        Ok(op)
    }
}

impl ValueFactory for GraphBuilder<'_> {
    fn context(&self) -> &IrContext {
        self.ctx
    }

    fn context_mut(&mut self) -> &mut IrContext {
        self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::graph::GraphValueDef;
    use crate::refs::{AttrRef, TreeValue};
    use cranelift_entity::EntityRef;

    fn graph_function(ctx: &mut IrContext) -> GraphFuncRef {
        let ty = Builder::new(ctx).function_type(&[], &[]).unwrap();
        ctx.create_graph_function("main", ty).unwrap()
    }

    #[test]
    fn new_builder_without_blocks_has_no_cursor() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        assert_eq!(b.insertion_point(), None);
        assert_eq!(
            b.create_operation(OperationState::new("test.op")),
            Err(IrError::NoInsertionPoint)
        );
    }

    #[test]
    fn create_block_appends_and_moves_cursor() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);

        let entry = b.create_block();
        let a = b.create_operation(OperationState::new("test.a")).unwrap();
        let next = b.create_block();
        assert_eq!(
            b.insertion_point(),
            Some(GraphInsertPoint {
                block: next,
                index: 0
            })
        );
        let c = b.create_operation(OperationState::new("test.c")).unwrap();

        assert_eq!(ctx.function_blocks(func), &[entry, next]);
        assert_eq!(ctx.block_ops(entry), &[a]);
        assert_eq!(ctx.block_ops(next), &[c]);
        assert_eq!(ctx.op(c).parent_block, next);
    }

    #[test]
    fn operations_land_at_the_cursor() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();

        let a = b.create_operation(OperationState::new("test.a")).unwrap();
        b.set_insertion_point(block, 1).unwrap();
        let c = b.create_operation(OperationState::new("test.c")).unwrap();
        b.set_insertion_point(block, 1).unwrap();
        let bop = b.create_operation(OperationState::new("test.b")).unwrap();

        assert_eq!(ctx.block_ops(block), &[a, bop, c]);
        assert_eq!(ctx.op_name(bop), "test.b");
    }

    #[test]
    fn cursor_is_not_auto_advanced() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();

        let first = b.create_operation(OperationState::new("test.first")).unwrap();
        let second = b.create_operation(OperationState::new("test.second")).unwrap();
        assert_eq!(b.insertion_point().unwrap().index, 0);
        assert_eq!(ctx.block_ops(block), &[second, first]);
    }

    #[test]
    fn results_operands_and_attributes() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();
        let f32_ty = b.f32_type();
        let arg = b.add_block_argument(block, f32_ty).unwrap();

        let one = b.float_attr(1.0);
        let cst = b
            .create_operation(OperationState::new("constant").result(f32_ty).attr("value", one))
            .unwrap();
        b.set_insertion_point_to_end(block).unwrap();
        let cst_val = b.context().op_result(cst, 0);
        let add = b
            .create_operation(
                OperationState::new("addf")
                    .operand(arg)
                    .operand(cst_val)
                    .result(f32_ty),
            )
            .unwrap();

        assert_eq!(ctx.block_args(block), &[arg]);
        assert_eq!(ctx.graph_value_def(arg), GraphValueDef::BlockArg(block, 0));
        assert_eq!(ctx.op_operands(add), &[arg, cst_val]);
        assert_eq!(ctx.op_result_types(add).as_slice(), &[f32_ty]);
        assert_eq!(
            ctx.graph_value_def(ctx.op_result(add, 0)),
            GraphValueDef::OpResult(add, 0)
        );
        assert_eq!(ctx.op_attr(cst, "value"), Some(one));
        assert_eq!(ctx.op_attr(cst, "missing"), None);
        assert_eq!(ctx.op_attr(add, "value"), None);
    }

    #[test]
    fn tree_operands_are_rejected_without_mutation() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();
        let f32_ty = b.f32_type();
        let arg = b.add_block_argument(block, f32_ty).unwrap();

        let err = b
            .create_operation(
                OperationState::new("addf")
                    .operand(arg)
                    .operand(TreeValue::new(0))
                    .result(f32_ty),
            )
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"operand #1 is not a graph value");
        assert!(ctx.block_ops(block).is_empty());
        assert_eq!(ctx.block_args(block).len(), 1);
    }

    #[test]
    fn invalid_cursors() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let other = graph_function(&mut ctx);
        let foreign = GraphBuilder::new(&mut ctx, other).create_block();

        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();
        let err = b.set_insertion_point(block, 1).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"invalid insertion point: position 1 is past the end of block1 (0 operation(s))"
        );
        assert!(matches!(
            b.set_insertion_point(foreign, 0),
            Err(IrError::InvalidCursor { .. })
        ));
        let f32_ty = b.f32_type();
        assert!(b.add_block_argument(foreign, f32_ty).is_err());
        assert_eq!(
            b.insertion_point(),
            Some(GraphInsertPoint { block, index: 0 })
        );
    }

    #[test]
    fn new_builder_resumes_at_end_of_last_block() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let (block, first) = {
            let mut b = GraphBuilder::new(&mut ctx, func);
            let block = b.create_block();
            let op = b.create_operation(OperationState::new("test.a")).unwrap();
            (block, op)
        };

        let mut b = GraphBuilder::new(&mut ctx, func);
        assert_eq!(
            b.insertion_point(),
            Some(GraphInsertPoint { block, index: 1 })
        );
        let second = b.create_operation(OperationState::new("test.b")).unwrap();
        assert_eq!(ctx.block_ops(block), &[first, second]);
    }

    #[test]
    fn dangling_refs_leave_the_block_untouched() {
        let mut ctx = IrContext::new();
        let func = graph_function(&mut ctx);
        let mut b = GraphBuilder::new(&mut ctx, func);
        let block = b.create_block();

        let err = b.add_block_argument(block, TypeRef::new(1000)).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"malformed IR value: block argument type ty1000 is not a type of this context"
        );
        let err = b
            .create_operation(OperationState::new("constant").attr("value", AttrRef::new(1000)))
            .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"malformed IR value: attribute `value` value attr1000 is not an attribute of this context"
        );
        assert!(
            b.create_operation(OperationState::new("constant").result(TypeRef::new(1000)))
                .is_err()
        );
        assert!(ctx.block_args(block).is_empty());
        assert!(ctx.block_ops(block).is_empty());
    }
}
