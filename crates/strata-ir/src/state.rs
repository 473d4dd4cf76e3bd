//! Operation request descriptor.

use smallvec::SmallVec;

use crate::context::IrContext;
use crate::error::{IrError, IrResult};
use crate::interner::Identifier;
use crate::refs::{AttrRef, TypeRef};
use crate::value::{BodyForm, Value};

/// Everything needed to create one operation, independent of the body form
/// it will be inserted into.
///
/// Built by the caller with the fluent setters and consumed by a cursor
/// builder's `create_operation`.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationState {
    pub name: String,
    pub operands: SmallVec<[Value; 4]>,
    pub result_types: SmallVec<[TypeRef; 2]>,
    pub attributes: Vec<(String, AttrRef)>,
}

impl OperationState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: SmallVec::new(),
            result_types: SmallVec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn operand(mut self, v: impl Into<Value>) -> Self {
        self.operands.push(v.into());
        self
    }

    pub fn operands<V: Into<Value>>(mut self, vs: impl IntoIterator<Item = V>) -> Self {
        self.operands.extend(vs.into_iter().map(Into::into));
        self
    }

    pub fn result(mut self, ty: TypeRef) -> Self {
        self.result_types.push(ty);
        self
    }

    pub fn results(mut self, tys: impl IntoIterator<Item = TypeRef>) -> Self {
        self.result_types.extend(tys);
        self
    }

    /// Set an attribute. A later value for the same name replaces the earlier one.
    pub fn attr(mut self, name: impl Into<String>, val: AttrRef) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = val,
            None => self.attributes.push((name, val)),
        }
        self
    }

    /// Narrow every operand to the value kind of body form `F`.
    ///
    /// Fails on the first operand that belongs to the other form or that does
    /// not name a value of `ctx`.
    pub(crate) fn narrow_operands<F: BodyForm>(
        &self,
        ctx: &IrContext,
    ) -> IrResult<SmallVec<[F::Value; 4]>> {
        self.operands
            .iter()
            .enumerate()
            .map(|(operand_index, &operand)| {
                let value = F::narrow(operand).ok_or(IrError::RepresentationMismatch {
                    operand_index,
                    expected: F::KIND,
                })?;
                if !F::is_live(ctx, value) {
                    return Err(IrError::UnknownOperand { operand_index });
                }
                Ok(value)
            })
            .collect()
    }

    /// Check that every result type and attribute value was issued by `ctx`.
    pub(crate) fn check_refs(&self, ctx: &IrContext) -> IrResult<()> {
        if let Some(pos) = self.result_types.iter().position(|&ty| !ctx.has_type(ty)) {
            return Err(IrError::malformed(format_args!(
                "result #{pos} type {} is not a type of this context",
                self.result_types[pos]
            )));
        }
        let dangling = self.attributes.iter().find(|(_, attr)| !ctx.has_attr(*attr));
        if let Some((name, attr)) = dangling {
            return Err(IrError::malformed(format_args!(
                "attribute `{name}` value {attr} is not an attribute of this context"
            )));
        }
        Ok(())
    }

    /// Intern the operation name and attribute keys.
    pub(crate) fn intern_names(
        &self,
        ctx: &mut IrContext,
    ) -> (Identifier, SmallVec<[(Identifier, AttrRef); 4]>) {
        let name = ctx.identifier(&self.name);
        let attributes = self
            .attributes
            .iter()
            .map(|(key, attr)| (ctx.identifier(key), *attr))
            .collect();
        (name, attributes)
    }
}
