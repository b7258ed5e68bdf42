// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Error Reporting
//!
//! Every fallible constructor returns an [`ErrorReport`] and also stores a copy of it in the
//! single error slot of its [`crate::Context`]. The slot is overwritten by the next failure.

use crate::term::TermRef;
use crate::types::TypeRef;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    #[default]
    #[error("no error")]
    NoError,
    #[error("invalid type")]
    InvalidType,
    #[error("invalid term")]
    InvalidTerm,
    #[error("invalid constant index")]
    InvalidConstantIndex,
    #[error("invalid variable index")]
    InvalidVarIndex,
    #[error("invalid tuple index")]
    InvalidTupleIndex,
    #[error("invalid rational format")]
    InvalidRationalFormat,
    #[error("invalid floating-point format")]
    InvalidFloatFormat,
    #[error("invalid binary bit-vector format")]
    InvalidBvBinFormat,
    #[error("invalid hexadecimal bit-vector format")]
    InvalidBvHexFormat,
    #[error("invalid shift amount")]
    InvalidBitShift,
    #[error("invalid bit-vector extraction range")]
    InvalidBvExtract,
    #[error("too many arguments")]
    TooManyArguments,
    #[error("too many variables")]
    TooManyVars,
    #[error("maximal bit-vector size exceeded")]
    MaxBvSizeExceeded,
    #[error("maximal polynomial degree exceeded")]
    DegreeOverflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("positive integer required")]
    PosIntRequired,
    #[error("non-negative integer required")]
    NonNegIntRequired,
    #[error("scalar or uninterpreted type required")]
    ScalarOrUTypeRequired,
    #[error("function term required")]
    FunctionRequired,
    #[error("tuple term required")]
    TupleRequired,
    #[error("variable required")]
    VariableRequired,
    #[error("arithmetic term required")]
    ArithTermRequired,
    #[error("bit-vector term required")]
    BitvectorRequired,
    #[error("scalar term required")]
    ScalarTermRequired,
    #[error("wrong number of arguments")]
    WrongNumberOfArguments,
    #[error("type mismatch")]
    TypeMismatch,
    #[error("incompatible types")]
    IncompatibleTypes,
    #[error("duplicate variable in quantifier")]
    DuplicateVariable,
    #[error("incompatible bit-vector sizes")]
    IncompatibleBvSizes,
    #[error("invalid or stale buffer handle")]
    InvalidBuffer,
}

/// Code plus the offending operands of the most recent failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{code}")]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub term1: Option<TermRef>,
    pub type1: Option<TypeRef>,
    pub term2: Option<TermRef>,
    pub type2: Option<TypeRef>,
    pub badval: i64,
}

impl ErrorReport {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            ..Default::default()
        }
    }

    pub fn term1(mut self, t: TermRef) -> Self {
        self.term1 = Some(t);
        self
    }

    pub fn type1(mut self, tau: TypeRef) -> Self {
        self.type1 = Some(tau);
        self
    }

    pub fn term2(mut self, t: TermRef) -> Self {
        self.term2 = Some(t);
        self
    }

    pub fn type2(mut self, tau: TypeRef) -> Self {
        self.type2 = Some(tau);
        self
    }

    pub fn badval(mut self, v: impl Into<i64>) -> Self {
        self.badval = v.into();
        self
    }
}

impl From<ErrorCode> for ErrorReport {
    fn from(code: ErrorCode) -> Self {
        ErrorReport::new(code)
    }
}

pub type Result<T> = std::result::Result<T, ErrorReport>;
