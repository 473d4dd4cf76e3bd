//! Builders: the value factory facade and the two cursor builders.
//!
//! `ValueFactory` turns a named factory call into a structural key and
//! forwards it to the context's interning tables. `Builder` is the plain
//! facade; `GraphBuilder` and `TreeBuilder` add an insertion cursor for one
//! function of the matching body form and expose the same factory methods.

mod graph;
mod tree;

pub use graph::{GraphBuilder, GraphInsertPoint};
pub use tree::{TreeBuilder, TreeInsertPoint};

use smallvec::SmallVec;

use crate::affine::{AffineBinaryKind, AffineExprData, AffineMapData, IntegerSetData};
use crate::attributes::AttributeData;
use crate::context::IrContext;
use crate::error::IrResult;
use crate::interner::Identifier;
use crate::refs::*;
use crate::types::{FloatKind, TypeData};

/// Factory methods for every interned value category.
///
/// Calling a factory twice with equal arguments yields the same ref. The only
/// side effect is on the context's interning tables. Factories whose arguments
/// include refs fail with `MalformedValue` when a ref was not issued by this
/// context.
pub trait ValueFactory {
    fn context(&self) -> &IrContext;

    fn context_mut(&mut self) -> &mut IrContext;

    fn identifier(&mut self, text: &str) -> Identifier {
        self.context_mut().identifier(text)
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn bf16_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::Float(FloatKind::BF16))
    }

    fn f16_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::Float(FloatKind::F16))
    }

    fn f32_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::Float(FloatKind::F32))
    }

    fn f64_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::Float(FloatKind::F64))
    }

    fn affine_int_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::AffineInt)
    }

    fn tf_control_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::TfControl)
    }

    fn tf_string_type(&mut self) -> TypeRef {
        self.context_mut().intern_scalar_type(TypeData::TfString)
    }

    fn integer_type(&mut self, width: u32) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::Integer { width })
    }

    fn function_type(&mut self, inputs: &[TypeRef], results: &[TypeRef]) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::Function {
            inputs: inputs.into(),
            results: results.into(),
        })
    }

    fn memref_type(
        &mut self,
        shape: &[i64],
        element: TypeRef,
        layout: &[AffineMapRef],
        memory_space: u32,
    ) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::MemRef {
            shape: shape.into(),
            element,
            layout: layout.into(),
            memory_space,
        })
    }

    fn vector_type(&mut self, shape: &[u32], element: TypeRef) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::Vector {
            shape: shape.into(),
            element,
        })
    }

    fn tensor_type(&mut self, shape: &[i64], element: TypeRef) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::RankedTensor {
            shape: shape.into(),
            element,
        })
    }

    fn unranked_tensor_type(&mut self, element: TypeRef) -> IrResult<TypeRef> {
        self.context_mut().intern_type(TypeData::UnrankedTensor { element })
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn bool_attr(&mut self, value: bool) -> AttrRef {
        self.context_mut().intern_scalar_attr(AttributeData::Bool(value))
    }

    fn integer_attr(&mut self, value: i64) -> AttrRef {
        self.context_mut().intern_scalar_attr(AttributeData::Integer(value))
    }

    fn float_attr(&mut self, value: f64) -> AttrRef {
        self.context_mut().intern_scalar_attr(AttributeData::float(value))
    }

    fn string_attr(&mut self, value: &str) -> AttrRef {
        self.context_mut().intern_scalar_attr(AttributeData::from(value))
    }

    fn type_attr(&mut self, ty: TypeRef) -> IrResult<AttrRef> {
        self.context_mut().intern_attr(AttributeData::Type(ty))
    }

    fn array_attr(&mut self, elements: &[AttrRef]) -> IrResult<AttrRef> {
        self.context_mut().intern_attr(AttributeData::Array(elements.into()))
    }

    fn affine_map_attr(&mut self, map: AffineMapRef) -> IrResult<AttrRef> {
        self.context_mut().intern_attr(AttributeData::AffineMap(map))
    }

    fn function_attr(&mut self, func: impl Into<FuncRef>) -> IrResult<AttrRef> {
        self.context_mut().intern_attr(AttributeData::Function(func.into()))
    }

    // ========================================================================
    // Affine expressions, affine maps, and integer sets
    // ========================================================================

    fn dim_expr(&mut self, position: u32) -> AffineExprRef {
        self.context_mut().intern_affine_leaf(AffineExprData::Dim(position))
    }

    fn symbol_expr(&mut self, position: u32) -> AffineExprRef {
        self.context_mut().intern_affine_leaf(AffineExprData::Symbol(position))
    }

    fn constant_expr(&mut self, value: i64) -> AffineExprRef {
        self.context_mut().intern_affine_leaf(AffineExprData::Constant(value))
    }

    fn add_expr(&mut self, lhs: AffineExprRef, rhs: AffineExprRef) -> IrResult<AffineExprRef> {
        binary_expr(self.context_mut(), AffineBinaryKind::Add, lhs, rhs)
    }

    fn mul_expr(&mut self, lhs: AffineExprRef, rhs: AffineExprRef) -> IrResult<AffineExprRef> {
        binary_expr(self.context_mut(), AffineBinaryKind::Mul, lhs, rhs)
    }

    fn mod_expr(&mut self, lhs: AffineExprRef, rhs: AffineExprRef) -> IrResult<AffineExprRef> {
        binary_expr(self.context_mut(), AffineBinaryKind::Mod, lhs, rhs)
    }

    fn floor_div_expr(
        &mut self,
        lhs: AffineExprRef,
        rhs: AffineExprRef,
    ) -> IrResult<AffineExprRef> {
        binary_expr(self.context_mut(), AffineBinaryKind::FloorDiv, lhs, rhs)
    }

    fn ceil_div_expr(&mut self, lhs: AffineExprRef, rhs: AffineExprRef) -> IrResult<AffineExprRef> {
        binary_expr(self.context_mut(), AffineBinaryKind::CeilDiv, lhs, rhs)
    }

    /// Pass an empty `range_sizes` for an unbounded map.
    fn affine_map(
        &mut self,
        dim_count: u32,
        symbol_count: u32,
        results: &[AffineExprRef],
        range_sizes: &[AffineExprRef],
    ) -> IrResult<AffineMapRef> {
        self.context_mut().intern_affine_map(AffineMapData {
            dim_count,
            symbol_count,
            results: results.into(),
            range_sizes: range_sizes.into(),
        })
    }

    fn integer_set(
        &mut self,
        dim_count: u32,
        symbol_count: u32,
        constraints: &[AffineExprRef],
        eq_flags: &[bool],
    ) -> IrResult<IntegerSetRef> {
        self.context_mut().intern_integer_set(IntegerSetData {
            dim_count,
            symbol_count,
            constraints: constraints.into(),
            eq_flags: SmallVec::from_slice(eq_flags),
        })
    }
}

fn binary_expr(
    ctx: &mut IrContext,
    kind: AffineBinaryKind,
    lhs: AffineExprRef,
    rhs: AffineExprRef,
) -> IrResult<AffineExprRef> {
    ctx.intern_affine_expr(AffineExprData::Binary { kind, lhs, rhs })
}

/// Stateless value factory bound to a context.
pub struct Builder<'a> {
    ctx: &'a mut IrContext,
}

impl<'a> Builder<'a> {
    pub fn new(ctx: &'a mut IrContext) -> Self {
        Self { ctx }
    }
}

impl ValueFactory for Builder<'_> {
    fn context(&self) -> &IrContext {
        self.ctx
    }

    fn context_mut(&mut self) -> &mut IrContext {
        self.ctx
    }
}
