//! IrContext: the per-compilation owner of every IR value.
//!
//! Interned values (types, attributes, affine expressions, affine maps,
//! integer sets) live in deduplicating `Interner`s. Function bodies of both
//! representations live in `PrimaryMap` arenas. Nothing is ever removed; all
//! refs stay valid until the context is dropped.

use cranelift_entity::PrimaryMap;

use crate::affine::{AffineExprData, AffineMapData, IntegerSetData};
use crate::attributes::AttributeData;
use crate::error::{IrError, IrResult};
use crate::graph::{BlockData, GraphFunctionData, GraphValueData, OperationData};
use crate::interner::{Identifier, IdentifierInterner, Interner};
use crate::refs::*;
use crate::tree::{
    StmtData, StmtListData, StmtListParent, TreeFunctionData, TreeValueData, TreeValueDef,
};
use crate::types::{TypeData, check_integer_width, check_ranked_shape, check_vector_shape};

/// Per-compilation IR context.
///
/// Guarantees identity ⇔ structural equality for every interned value it
/// issues. A context is meant for one thread at a time; independent
/// compilations use independent contexts.
pub struct IrContext {
    idents: IdentifierInterner,
    types: Interner<TypeRef, TypeData>,
    attrs: Interner<AttrRef, AttributeData>,
    affine_exprs: Interner<AffineExprRef, AffineExprData>,
    affine_maps: Interner<AffineMapRef, AffineMapData>,
    integer_sets: Interner<IntegerSetRef, IntegerSetData>,

    // Graph-form storage.
    pub(crate) graph_funcs: PrimaryMap<GraphFuncRef, GraphFunctionData>,
    pub(crate) blocks: PrimaryMap<BlockRef, BlockData>,
    pub(crate) ops: PrimaryMap<OpRef, OperationData>,
    pub(crate) graph_values: PrimaryMap<GraphValue, GraphValueData>,

    // Tree-form storage.
    pub(crate) tree_funcs: PrimaryMap<TreeFuncRef, TreeFunctionData>,
    pub(crate) stmt_lists: PrimaryMap<StmtListRef, StmtListData>,
    pub(crate) stmts: PrimaryMap<StmtRef, StmtData>,
    pub(crate) tree_values: PrimaryMap<TreeValue, TreeValueData>,
}

impl IrContext {
    /// Create a new empty IR context.
    pub fn new() -> Self {
        Self {
            idents: IdentifierInterner::new(),
            types: Interner::new(),
            attrs: Interner::new(),
            affine_exprs: Interner::new(),
            affine_maps: Interner::new(),
            integer_sets: Interner::new(),
            graph_funcs: PrimaryMap::new(),
            blocks: PrimaryMap::new(),
            ops: PrimaryMap::new(),
            graph_values: PrimaryMap::new(),
            tree_funcs: PrimaryMap::new(),
            stmt_lists: PrimaryMap::new(),
            stmts: PrimaryMap::new(),
            tree_values: PrimaryMap::new(),
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    pub fn identifier(&mut self, text: &str) -> Identifier {
        self.idents.intern(text)
    }

    pub fn resolve_identifier(&self, ident: Identifier) -> &str {
        self.idents.resolve(ident)
    }

    /// Look up an identifier without interning it.
    pub fn lookup_identifier(&self, text: &str) -> Option<Identifier> {
        self.idents.get(text)
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Intern a type after checking that its description is consistent.
    pub fn intern_type(&mut self, data: TypeData) -> IrResult<TypeRef> {
        if let Err(err) = self.check_type(&data) {
            tracing::debug!(%err, "rejected type request");
            return Err(err);
        }
        Ok(self.types.intern(data))
    }

    pub fn type_data(&self, ty: TypeRef) -> &TypeData {
        self.types.get(ty)
    }

    /// Whether `ty` was issued by this context.
    pub fn has_type(&self, ty: TypeRef) -> bool {
        self.types.contains(ty)
    }

    /// Intern a type that carries no refs and no width or shape.
    pub(crate) fn intern_scalar_type(&mut self, data: TypeData) -> TypeRef {
        debug_assert!(matches!(
            data,
            TypeData::Float(_) | TypeData::AffineInt | TypeData::TfControl | TypeData::TfString
        ));
        self.types.intern(data)
    }

    fn check_type(&self, data: &TypeData) -> IrResult<()> {
        match data {
            TypeData::Integer { width } => check_integer_width(*width),
            TypeData::Function { inputs, results } => {
                for &ty in inputs {
                    self.check_type_ref(ty, "function input")?;
                }
                for &ty in results {
                    self.check_type_ref(ty, "function result")?;
                }
                Ok(())
            }
            TypeData::Vector { shape, element } => {
                check_vector_shape(shape)?;
                self.check_type_ref(*element, "element type")
            }
            TypeData::RankedTensor { shape, element } => {
                check_ranked_shape(shape)?;
                self.check_type_ref(*element, "element type")
            }
            TypeData::UnrankedTensor { element } => self.check_type_ref(*element, "element type"),
            TypeData::MemRef {
                shape,
                element,
                layout,
                ..
            } => {
                check_ranked_shape(shape)?;
                self.check_type_ref(*element, "element type")?;
                self.check_layout(shape.len(), layout)
            }
            TypeData::Float(_) | TypeData::AffineInt | TypeData::TfControl | TypeData::TfString => {
                Ok(())
            }
        }
    }

    fn check_type_ref(&self, ty: TypeRef, role: &str) -> IrResult<()> {
        if !self.types.contains(ty) {
            return Err(IrError::malformed(format_args!(
                "{role} {ty} is not a type of this context"
            )));
        }
        Ok(())
    }

    /// The layout maps compose left to right starting from the memref's index
    /// space, so each map must accept as many dimensions as its input has.
    fn check_layout(&self, rank: usize, layout: &[AffineMapRef]) -> IrResult<()> {
        let mut expected = rank;
        for (i, &map) in layout.iter().enumerate() {
            if !self.affine_maps.contains(map) {
                return Err(IrError::malformed(format_args!(
                    "layout map #{i} ({map}) is not an affine map of this context"
                )));
            }
            let data = self.affine_maps.get(map);
            if data.dim_count as usize != expected {
                return Err(IrError::malformed(format_args!(
                    "layout map #{i} takes {} dimension(s) but its input has {expected}",
                    data.dim_count
                )));
            }
            expected = data.results.len();
        }
        Ok(())
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn intern_attr(&mut self, data: AttributeData) -> IrResult<AttrRef> {
        if let Err(err) = self.check_attr(&data) {
            tracing::debug!(%err, "rejected attribute request");
            return Err(err);
        }
        Ok(self.attrs.intern(data))
    }

    pub fn attr_data(&self, attr: AttrRef) -> &AttributeData {
        self.attrs.get(attr)
    }

    pub fn has_attr(&self, attr: AttrRef) -> bool {
        self.attrs.contains(attr)
    }

    /// Intern an attribute that carries no refs.
    pub(crate) fn intern_scalar_attr(&mut self, data: AttributeData) -> AttrRef {
        debug_assert!(matches!(
            data,
            AttributeData::Bool(_)
                | AttributeData::Integer(_)
                | AttributeData::FloatBits(_)
                | AttributeData::String(_)
        ));
        self.attrs.intern(data)
    }

    fn check_attr(&self, data: &AttributeData) -> IrResult<()> {
        match data {
            AttributeData::Type(ty) => self.check_type_ref(*ty, "type attribute payload"),
            AttributeData::Array(elements) => {
                match elements.iter().position(|&attr| !self.attrs.contains(attr)) {
                    Some(pos) => Err(IrError::malformed(format_args!(
                        "array element #{pos} ({}) is not an attribute of this context",
                        elements[pos]
                    ))),
                    None => Ok(()),
                }
            }
            AttributeData::AffineMap(map) if !self.affine_maps.contains(*map) => Err(
                IrError::malformed(format_args!("{map} is not an affine map of this context")),
            ),
            AttributeData::Function(func) => {
                let exists = match *func {
                    FuncRef::Graph(f) => self.graph_funcs.is_valid(f),
                    FuncRef::Tree(f) => self.tree_funcs.is_valid(f),
                };
                if exists {
                    Ok(())
                } else {
                    Err(IrError::malformed(format_args!(
                        "function attribute references unknown function {func}"
                    )))
                }
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Affine expressions, maps, and integer sets
    // ========================================================================

    /// Intern an affine expression. A binary node's operands must already be
    /// interned in this context.
    pub fn intern_affine_expr(&mut self, data: AffineExprData) -> IrResult<AffineExprRef> {
        if let AffineExprData::Binary { kind, lhs, rhs } = data {
            if let Err(err) = self
                .check_affine_ref(lhs)
                .and_then(|()| self.check_affine_ref(rhs))
            {
                tracing::debug!(%kind, %err, "rejected affine expression request");
                return Err(err);
            }
        }
        Ok(self.affine_exprs.intern(data))
    }

    /// Intern a dimension, symbol, or constant expression.
    pub(crate) fn intern_affine_leaf(&mut self, data: AffineExprData) -> AffineExprRef {
        debug_assert!(!matches!(data, AffineExprData::Binary { .. }));
        self.affine_exprs.intern(data)
    }

    pub fn affine_expr_data(&self, expr: AffineExprRef) -> AffineExprData {
        *self.affine_exprs.get(expr)
    }

    pub fn has_affine_expr(&self, expr: AffineExprRef) -> bool {
        self.affine_exprs.contains(expr)
    }

    /// The constant value of `expr`, if it is a constant expression of this
    /// context.
    pub fn affine_constant(&self, expr: AffineExprRef) -> Option<i64> {
        if !self.affine_exprs.contains(expr) {
            return None;
        }
        self.affine_exprs.get(expr).as_constant()
    }

    fn check_affine_ref(&self, expr: AffineExprRef) -> IrResult<()> {
        if !self.affine_exprs.contains(expr) {
            return Err(IrError::malformed(format_args!(
                "{expr} is not an affine expression of this context"
            )));
        }
        Ok(())
    }

    pub fn intern_affine_map(&mut self, data: AffineMapData) -> IrResult<AffineMapRef> {
        let checked = if data.is_bounded() && data.range_sizes.len() != data.results.len() {
            Err(IrError::malformed(format_args!(
                "affine map has {} result(s) but {} range size(s)",
                data.results.len(),
                data.range_sizes.len()
            )))
        } else {
            data.results
                .iter()
                .try_for_each(|&expr| {
                    self.check_affine_positions(expr, data.dim_count, data.symbol_count)
                })
                .and_then(|()| {
                    data.range_sizes
                        .iter()
                        .try_for_each(|&expr| self.check_affine_ref(expr))
                })
        };
        if let Err(err) = checked {
            tracing::debug!(%err, "rejected affine map request");
            return Err(err);
        }
        Ok(self.affine_maps.intern(data))
    }

    pub fn affine_map_data(&self, map: AffineMapRef) -> &AffineMapData {
        self.affine_maps.get(map)
    }

    pub fn has_affine_map(&self, map: AffineMapRef) -> bool {
        self.affine_maps.contains(map)
    }

    pub fn intern_integer_set(&mut self, data: IntegerSetData) -> IrResult<IntegerSetRef> {
        let checked = if data.eq_flags.len() != data.constraints.len() {
            Err(IrError::malformed(format_args!(
                "integer set has {} constraint(s) but {} equality flag(s)",
                data.constraints.len(),
                data.eq_flags.len()
            )))
        } else {
            data.constraints.iter().try_for_each(|&expr| {
                self.check_affine_positions(expr, data.dim_count, data.symbol_count)
            })
        };
        if let Err(err) = checked {
            tracing::debug!(%err, "rejected integer set request");
            return Err(err);
        }
        Ok(self.integer_sets.intern(data))
    }

    pub fn integer_set_data(&self, set: IntegerSetRef) -> &IntegerSetData {
        self.integer_sets.get(set)
    }

    pub fn has_integer_set(&self, set: IntegerSetRef) -> bool {
        self.integer_sets.contains(set)
    }

    /// Check that every dimension and symbol used by `root` is declared.
    fn check_affine_positions(
        &self,
        root: AffineExprRef,
        dim_count: u32,
        symbol_count: u32,
    ) -> IrResult<()> {
        let mut worklist = vec![root];
        while let Some(expr) = worklist.pop() {
            self.check_affine_ref(expr)?;
            match *self.affine_exprs.get(expr) {
                AffineExprData::Dim(pos) if pos >= dim_count => {
                    return Err(IrError::malformed(format_args!(
                        "dimension d{pos} used with only {dim_count} dimension(s)"
                    )));
                }
                AffineExprData::Symbol(pos) if pos >= symbol_count => {
                    return Err(IrError::malformed(format_args!(
                        "symbol s{pos} used with only {symbol_count} symbol(s)"
                    )));
                }
                AffineExprData::Binary { lhs, rhs, .. } => {
                    worklist.push(lhs);
                    worklist.push(rhs);
                }
                _ => {}
            }
        }
        Ok(())
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn function_signature(&self, ty: TypeRef) -> IrResult<&[TypeRef]> {
        self.check_type_ref(ty, "function signature")?;
        match self.types.get(ty) {
            TypeData::Function { inputs, .. } => Ok(inputs.as_slice()),
            other => Err(IrError::malformed(format_args!(
                "function signature must be a function type, got {other:?}"
            ))),
        }
    }

    /// Create a function whose body is a list of blocks. The body starts empty.
    pub fn create_graph_function(&mut self, name: &str, ty: TypeRef) -> IrResult<GraphFuncRef> {
        self.function_signature(ty)?;
        let name = self.idents.intern(name);
        let func = self.graph_funcs.push(GraphFunctionData {
            name,
            ty,
            blocks: Vec::new(),
        });
        tracing::debug!(%func, "created graph function");
        Ok(func)
    }

    /// Create a function whose body is a statement list. One argument value is
    /// allocated per input of `ty`.
    pub fn create_tree_function(&mut self, name: &str, ty: TypeRef) -> IrResult<TreeFuncRef> {
        let inputs = self.function_signature(ty)?.to_vec();
        let name = self.idents.intern(name);
        let func = self.tree_funcs.next_key();
        let body = self.stmt_lists.push(StmtListData {
            function: func,
            parent: StmtListParent::Function(func),
            stmts: Vec::new(),
        });
        let args = inputs
            .into_iter()
            .enumerate()
            .map(|(idx, ty)| {
                self.tree_values.push(TreeValueData {
                    def: TreeValueDef::FuncArg(func, idx as u32),
                    ty,
                })
            })
            .collect();
        let pushed = self.tree_funcs.push(TreeFunctionData {
            name,
            ty,
            body,
            args,
        });
        debug_assert_eq!(pushed, func);
        tracing::debug!(%func, "created tree function");
        Ok(func)
    }

    pub fn graph_functions(&self) -> impl Iterator<Item = GraphFuncRef> + '_ {
        self.graph_funcs.keys()
    }

    pub fn tree_functions(&self) -> impl Iterator<Item = TreeFuncRef> + '_ {
        self.tree_funcs.keys()
    }

    pub fn function_name(&self, func: FuncRef) -> &str {
        let name = match func {
            FuncRef::Graph(f) => self.graph_funcs[f].name,
            FuncRef::Tree(f) => self.tree_funcs[f].name,
        };
        self.idents.resolve(name)
    }

    pub fn function_type(&self, func: FuncRef) -> TypeRef {
        match func {
            FuncRef::Graph(f) => self.graph_funcs[f].ty,
            FuncRef::Tree(f) => self.tree_funcs[f].ty,
        }
    }
}

impl Default for IrContext {
    fn default() -> Self {
        Self::new()
    }
}
