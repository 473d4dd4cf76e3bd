//! Type payloads.
//!
//! A `TypeData` is the full structural key of a type: two types are the same
//! `TypeRef` exactly when their `TypeData` compare equal.

use smallvec::SmallVec;

use crate::error::{IrError, IrResult};
use crate::refs::{AffineMapRef, TypeRef};

/// Widest integer type that can be requested.
pub const MAX_INTEGER_WIDTH: u32 = 4096;

/// Marker for a dynamic dimension in tensor and memref shapes.
pub const DYNAMIC_SIZE: i64 = -1;

/// Floating-point formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    /// 16-bit brain float (8-bit exponent, reduced mantissa).
    BF16,
    F16,
    F32,
    F64,
}

impl FloatKind {
    pub fn width(self) -> u32 {
        match self {
            FloatKind::BF16 | FloatKind::F16 => 16,
            FloatKind::F32 => 32,
            FloatKind::F64 => 64,
        }
    }
}

/// Data for a single interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Float(FloatKind),
    Integer {
        width: u32,
    },
    /// Index-like integer used by affine loops.
    AffineInt,
    TfControl,
    TfString,
    Function {
        inputs: SmallVec<[TypeRef; 4]>,
        results: SmallVec<[TypeRef; 2]>,
    },
    Vector {
        shape: SmallVec<[u32; 4]>,
        element: TypeRef,
    },
    RankedTensor {
        shape: SmallVec<[i64; 4]>,
        element: TypeRef,
    },
    UnrankedTensor {
        element: TypeRef,
    },
    MemRef {
        shape: SmallVec<[i64; 4]>,
        element: TypeRef,
        layout: SmallVec<[AffineMapRef; 2]>,
        memory_space: u32,
    },
}

impl TypeData {
    pub fn is_function(&self) -> bool {
        matches!(self, TypeData::Function { .. })
    }

    /// Element type of a shaped type.
    pub fn element_type(&self) -> Option<TypeRef> {
        match self {
            TypeData::Vector { element, .. }
            | TypeData::RankedTensor { element, .. }
            | TypeData::UnrankedTensor { element }
            | TypeData::MemRef { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Rank of a ranked shaped type.
    pub fn rank(&self) -> Option<usize> {
        match self {
            TypeData::Vector { shape, .. } => Some(shape.len()),
            TypeData::RankedTensor { shape, .. } | TypeData::MemRef { shape, .. } => {
                Some(shape.len())
            }
            _ => None,
        }
    }
}

pub(crate) fn check_integer_width(width: u32) -> IrResult<()> {
    if width == 0 || width > MAX_INTEGER_WIDTH {
        return Err(IrError::malformed(format_args!(
            "integer width {width} is outside 1..={MAX_INTEGER_WIDTH}"
        )));
    }
    Ok(())
}

pub(crate) fn check_vector_shape(shape: &[u32]) -> IrResult<()> {
    if shape.is_empty() {
        return Err(IrError::malformed("vector shape must not be empty"));
    }
    if let Some(pos) = shape.iter().position(|&d| d == 0) {
        return Err(IrError::malformed(format_args!(
            "vector dimension #{pos} has size zero"
        )));
    }
    Ok(())
}

/// Ranked tensor and memref dimensions are either sizes or `DYNAMIC_SIZE`.
pub(crate) fn check_ranked_shape(shape: &[i64]) -> IrResult<()> {
    if let Some(pos) = shape.iter().position(|&d| d < DYNAMIC_SIZE) {
        return Err(IrError::malformed(format_args!(
            "dimension #{pos} has invalid size {}",
            shape[pos]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;
    use smallvec::smallvec;

    #[test]
    fn float_widths() {
        assert_eq!(FloatKind::BF16.width(), 16);
        assert_eq!(FloatKind::F16.width(), 16);
        assert_eq!(FloatKind::F32.width(), 32);
        assert_eq!(FloatKind::F64.width(), 64);
        assert_ne!(
            TypeData::Float(FloatKind::BF16),
            TypeData::Float(FloatKind::F16)
        );
    }

    #[test]
    fn shaped_queries() {
        let elem = TypeRef::new(0);
        let tensor = TypeData::RankedTensor {
            shape: smallvec![2, DYNAMIC_SIZE],
            element: elem,
        };
        assert_eq!(tensor.rank(), Some(2));
        assert_eq!(tensor.element_type(), Some(elem));

        let unranked = TypeData::UnrankedTensor { element: elem };
        assert_eq!(unranked.rank(), None);
        assert_eq!(unranked.element_type(), Some(elem));

        assert_eq!(TypeData::AffineInt.element_type(), None);
    }

    #[test]
    fn width_bounds() {
        assert!(check_integer_width(1).is_ok());
        assert!(check_integer_width(MAX_INTEGER_WIDTH).is_ok());
        assert!(check_integer_width(0).is_err());
        assert!(check_integer_width(MAX_INTEGER_WIDTH + 1).is_err());
    }

    #[test]
    fn shape_checks() {
        assert!(check_vector_shape(&[4, 4]).is_ok());
        assert!(check_vector_shape(&[]).is_err());
        assert!(check_vector_shape(&[4, 0]).is_err());
        assert!(check_ranked_shape(&[DYNAMIC_SIZE, 0, 8]).is_ok());
        insta::assert_snapshot!(
            check_ranked_shape(&[3, -2]).unwrap_err().to_string(),
            @"malformed IR value: dimension #1 has invalid size -2"
        );
    }
}
