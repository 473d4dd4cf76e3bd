//! Tree-form bodies: a function is a lexically nested list of statements.
//!
//! A statement is either an operation statement or a loop. A loop owns its
//! affine bounds and a nested statement list. Tree values are function
//! arguments, loop induction variables, and operation statement results.
//! Only `TreeBuilder` mutates statement lists.

use smallvec::SmallVec;

use crate::context::IrContext;
use crate::interner::Identifier;
use crate::refs::{
    AffineExprRef, AttrRef, StmtListRef, StmtRef, TreeFuncRef, TreeValue, TypeRef,
};

/// Where a tree value is defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeValueDef {
    FuncArg(TreeFuncRef, u32),
    /// Result of an operation statement at the given index.
    StmtResult(StmtRef, u32),
    /// Induction variable of a loop statement.
    InductionVar(StmtRef),
}

pub struct TreeValueData {
    pub def: TreeValueDef,
    pub ty: TypeRef,
}

pub struct TreeFunctionData {
    pub name: Identifier,
    pub ty: TypeRef,
    pub body: StmtListRef,
    pub args: SmallVec<[TreeValue; 4]>,
}

/// Owner of a statement list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StmtListParent {
    Function(TreeFuncRef),
    Loop(StmtRef),
}

pub struct StmtListData {
    /// Function the list ultimately belongs to.
    pub function: TreeFuncRef,
    pub parent: StmtListParent,
    pub stmts: Vec<StmtRef>,
}

pub struct StmtData {
    pub parent_list: StmtListRef,
    pub kind: StmtKind,
}

pub enum StmtKind {
    Operation(OperationStmtData),
    Loop(LoopData),
}

pub struct OperationStmtData {
    pub name: Identifier,
    pub operands: SmallVec<[TreeValue; 4]>,
    pub results: SmallVec<[TreeValue; 2]>,
    pub attributes: SmallVec<[(Identifier, AttrRef); 4]>,
}

/// A counted loop; bounds and step are constant affine expressions.
pub struct LoopData {
    pub lower: AffineExprRef,
    pub upper: AffineExprRef,
    pub step: AffineExprRef,
    pub induction_var: TreeValue,
    pub body: StmtListRef,
}

impl StmtData {
    pub fn as_operation(&self) -> Option<&OperationStmtData> {
        match &self.kind {
            StmtKind::Operation(op) => Some(op),
            StmtKind::Loop(_) => None,
        }
    }

    pub fn as_loop(&self) -> Option<&LoopData> {
        match &self.kind {
            StmtKind::Loop(l) => Some(l),
            StmtKind::Operation(_) => None,
        }
    }
}

impl IrContext {
    // ========================================================================
    // Functions and statement lists
    // ========================================================================

    pub fn tree_function_body(&self, func: TreeFuncRef) -> StmtListRef {
        self.tree_funcs[func].body
    }

    pub fn tree_function_args(&self, func: TreeFuncRef) -> &[TreeValue] {
        &self.tree_funcs[func].args
    }

    pub fn stmt_list(&self, list: StmtListRef) -> &[StmtRef] {
        &self.stmt_lists[list].stmts
    }

    pub fn stmt_list_function(&self, list: StmtListRef) -> TreeFuncRef {
        self.stmt_lists[list].function
    }

    pub fn stmt_list_parent(&self, list: StmtListRef) -> StmtListParent {
        self.stmt_lists[list].parent
    }

    pub fn has_stmt_list(&self, list: StmtListRef) -> bool {
        self.stmt_lists.is_valid(list)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn stmt(&self, stmt: StmtRef) -> &StmtData {
        &self.stmts[stmt]
    }

    /// Name of an operation statement; `None` for loops.
    pub fn stmt_name(&self, stmt: StmtRef) -> Option<&str> {
        let op = self.stmts[stmt].as_operation()?;
        Some(self.resolve_identifier(op.name))
    }

    pub fn stmt_operands(&self, stmt: StmtRef) -> &[TreeValue] {
        self.stmts[stmt]
            .as_operation()
            .map(|op| op.operands.as_slice())
            .unwrap_or_default()
    }

    pub fn stmt_results(&self, stmt: StmtRef) -> &[TreeValue] {
        self.stmts[stmt]
            .as_operation()
            .map(|op| op.results.as_slice())
            .unwrap_or_default()
    }

    pub fn stmt_attr(&self, stmt: StmtRef, name: &str) -> Option<AttrRef> {
        let key = self.lookup_identifier(name)?;
        self.stmts[stmt]
            .as_operation()?
            .attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, attr)| attr)
    }

    pub fn loop_data(&self, stmt: StmtRef) -> Option<&LoopData> {
        self.stmts[stmt].as_loop()
    }

    pub fn loop_body(&self, stmt: StmtRef) -> Option<StmtListRef> {
        self.loop_data(stmt).map(|l| l.body)
    }

    // ========================================================================
    // Values
    // ========================================================================

    pub fn has_tree_value(&self, value: TreeValue) -> bool {
        self.tree_values.is_valid(value)
    }

    pub fn tree_value_type(&self, value: TreeValue) -> TypeRef {
        self.tree_values[value].ty
    }

    pub fn tree_value_def(&self, value: TreeValue) -> TreeValueDef {
        self.tree_values[value].def
    }

    // ========================================================================
    // Mutation (TreeBuilder only)
    // ========================================================================

    /// Create an operation statement and splice it into `list` at `index`.
    ///
    /// Operands must already be validated; this cannot fail.
    pub(crate) fn insert_op_stmt(
        &mut self,
        list: StmtListRef,
        index: usize,
        name: Identifier,
        operands: SmallVec<[TreeValue; 4]>,
        result_types: &[TypeRef],
        attributes: SmallVec<[(Identifier, AttrRef); 4]>,
    ) -> StmtRef {
        let stmt = self.stmts.next_key();
        let results = result_types
            .iter()
            .enumerate()
            .map(|(idx, &ty)| {
                self.tree_values.push(TreeValueData {
                    def: TreeValueDef::StmtResult(stmt, idx as u32),
                    ty,
                })
            })
            .collect();
        let pushed = self.stmts.push(StmtData {
            parent_list: list,
            kind: StmtKind::Operation(OperationStmtData {
                name,
                operands,
                results,
                attributes,
            }),
        });
        debug_assert_eq!(pushed, stmt);
        self.stmt_lists[list].stmts.insert(index, stmt);
        stmt
    }

    /// Create a loop statement with an empty body and splice it into `list`
    /// at `index`.
    pub(crate) fn insert_loop(
        &mut self,
        list: StmtListRef,
        index: usize,
        bounds: [AffineExprRef; 3],
        induction_ty: TypeRef,
    ) -> StmtRef {
        let [lower, upper, step] = bounds;
        let function = self.stmt_lists[list].function;
        let stmt = self.stmts.next_key();
        let body = self.stmt_lists.push(StmtListData {
            function,
            parent: StmtListParent::Loop(stmt),
            stmts: Vec::new(),
        });
        let induction_var = self.tree_values.push(TreeValueData {
            def: TreeValueDef::InductionVar(stmt),
            ty: induction_ty,
        });
        let pushed = self.stmts.push(StmtData {
            parent_list: list,
            kind: StmtKind::Loop(LoopData {
                lower,
                upper,
                step,
                induction_var,
                body,
            }),
        });
        debug_assert_eq!(pushed, stmt);
        self.stmt_lists[list].stmts.insert(index, stmt);
        stmt
    }
}
