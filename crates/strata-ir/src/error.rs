//! Error types for IR construction.

use derive_more::{Display, Error};

use crate::value::BodyKind;

/// Result type for IR construction.
pub type IrResult<T> = Result<T, IrError>;

/// Errors reported while constructing IR values or splicing nodes into a body.
///
/// Every error is reported before any table or body is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum IrError {
    /// A value request whose structural description is internally inconsistent.
    #[display("malformed IR value: {reason}")]
    MalformedValue { reason: String },

    /// An operand that belongs to the other body representation.
    #[display("operand #{operand_index} is not a {expected} value")]
    RepresentationMismatch {
        operand_index: usize,
        expected: BodyKind,
    },

    /// An operand reference that does not name a value of this context.
    #[display("operand #{operand_index} does not name a live value")]
    UnknownOperand { operand_index: usize },

    /// An insertion point outside its container, or in a foreign container.
    #[display("invalid insertion point: {reason}")]
    InvalidCursor { reason: String },

    /// A creation call before any insertion point exists.
    #[display("no insertion point set")]
    NoInsertionPoint,

    /// A loop bound or step that is not an affine constant.
    #[display("loop {bound} must be a constant affine expression")]
    NonConstantLoopBound { bound: &'static str },
}

impl IrError {
    pub(crate) fn malformed(reason: impl std::fmt::Display) -> Self {
        IrError::MalformedValue {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_cursor(reason: impl std::fmt::Display) -> Self {
        IrError::InvalidCursor {
            reason: reason.to_string(),
        }
    }
}
