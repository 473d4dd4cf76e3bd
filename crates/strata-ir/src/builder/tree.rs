//! Cursor builder for tree-form functions.

use crate::context::IrContext;
use crate::error::{IrError, IrResult};
use crate::refs::{AffineExprRef, StmtListRef, StmtRef, TreeFuncRef};
use crate::state::OperationState;
use crate::value::Tree;

use super::ValueFactory;

/// Position between two statements of a statement list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeInsertPoint {
    pub list: StmtListRef,
    pub index: usize,
}

/// Creates loops and operation statements in one tree-form function.
///
/// Creation never moves the cursor; to fill a loop body, point the cursor at
/// `ctx.loop_body(loop)` explicitly.
pub struct TreeBuilder<'a> {
    ctx: &'a mut IrContext,
    function: TreeFuncRef,
    cursor: TreeInsertPoint,
}

impl<'a> TreeBuilder<'a> {
    /// Bind a builder to `function`, with the cursor at the end of its body.
    pub fn new(ctx: &'a mut IrContext, function: TreeFuncRef) -> Self {
        let list = ctx.tree_function_body(function);
        let index = ctx.stmt_list(list).len();
        Self {
            ctx,
            function,
            cursor: TreeInsertPoint { list, index },
        }
    }

    pub fn function(&self) -> TreeFuncRef {
        self.function
    }

    pub fn insertion_point(&self) -> TreeInsertPoint {
        self.cursor
    }

    /// Move the cursor to `index` within `list`.
    pub fn set_insertion_point(&mut self, list: StmtListRef, index: usize) -> IrResult<()> {
        if !self.ctx.has_stmt_list(list) || self.ctx.stmt_list_function(list) != self.function {
            return Err(IrError::invalid_cursor(format_args!(
                "{list} does not belong to {}",
                self.function
            )));
        }
        let len = self.ctx.stmt_list(list).len();
        if index > len {
            return Err(IrError::invalid_cursor(format_args!(
                "position {index} is past the end of {list} ({len} statement(s))"
            )));
        }
        tracing::debug!(%list, index, "moved tree insertion point");
        self.cursor = TreeInsertPoint { list, index };
        Ok(())
    }

    pub fn set_insertion_point_to_start(&mut self, list: StmtListRef) -> IrResult<()> {
        self.set_insertion_point(list, 0)
    }

    pub fn set_insertion_point_to_end(&mut self, list: StmtListRef) -> IrResult<()> {
        let len = if self.ctx.has_stmt_list(list) {
            self.ctx.stmt_list(list).len()
        } else {
            0
        };
        self.set_insertion_point(list, len)
    }

    /// Create a loop at the cursor. `step` defaults to the constant `1`.
    ///
    /// The bounds and the step must be constant affine expressions of this
    /// context.
    pub fn create_loop(
        &mut self,
        lower: AffineExprRef,
        upper: AffineExprRef,
        step: Option<AffineExprRef>,
    ) -> IrResult<StmtRef> {
        let step = match step {
            Some(step) => step,
            None => self.constant_expr(1),
        };
        for (bound, expr) in [("lower bound", lower), ("upper bound", upper), ("step", step)] {
            let err = if !self.ctx.has_affine_expr(expr) {
                IrError::malformed(format_args!(
                    "loop {bound} {expr} is not an affine expression of this context"
                ))
            } else if self.ctx.affine_constant(expr).is_none() {
                IrError::NonConstantLoopBound { bound }
            } else {
                continue;
            };
            tracing::debug!(%err, "rejected loop");
            return Err(err);
        }
        let induction_ty = self.affine_int_type();
        let point = self.cursor;
        let stmt = self
            .ctx
            .insert_loop(point.list, point.index, [lower, upper, step], induction_ty);
        tracing::debug!(%stmt, list = %point.list, index = point.index, "created loop");
        Ok(stmt)
    }

    /// Create an operation statement from `state` and splice it in at the
    /// cursor.
    ///
    /// Every operand must be a tree value of this context, and every result
    /// type and attribute must come from this context. On failure the body is
    /// left untouched.
    pub fn create_operation(&mut self, state: OperationState) -> IrResult<StmtRef> {
        let checked = state.narrow_operands::<Tree>(self.ctx).and_then(|operands| {
            state.check_refs(self.ctx)?;
            Ok(operands)
        });
        let operands = match checked {
            Ok(operands) => operands,
            Err(err) => {
                tracing::debug!(name = %state.name, %err, "rejected tree operation");
                return Err(err);
            }
        };
        let (name, attributes) = state.intern_names(self.ctx);
        let point = self.cursor;
        let stmt = self.ctx.insert_op_stmt(
            point.list,
            point.index,
            name,
            operands,
            &state.result_types,
            attributes,
        );
        tracing::debug!(
            name = %state.name,
            %stmt,
            list = %point.list,
            index = point.index,
            "created operation statement"
        );
        Ok(stmt)
    }
}

impl ValueFactory for TreeBuilder<'_> {
    fn context(&self) -> &IrContext {
        self.ctx
    }

    fn context_mut(&mut self) -> &mut IrContext {
        self.ctx
    }
}
