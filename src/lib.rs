// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Patronus Terms
//!
//! Hash-consed types and terms for SMT problems. A [`Context`] owns every table. Terms are
//! built through simplifying constructors that keep the term graph in a canonical form, so
//! that structurally equal terms are always represented by the same [`TermRef`].
#[macro_use]
extern crate lazy_static;

mod bitnodes;
mod buffers;
mod build;
mod bvconst;
mod check;
mod config;
mod context;
mod error;
mod names;
mod parse;
mod pprod;
mod term;
mod types;

pub use bitnodes::{BitNode, NodeRef, NodeTable};
pub use buffers::{
    ArithBuffer, BufferRef, BvArith64Buffer, BvArithBuffer, BvArithWideBuffer, BvCoeff,
    BvLogicBuffer, BvMonomial, Monomial, Pool, ScratchBuffer,
};
pub use config::Config;
pub use context::{Context, Pooled};
pub use error::{ErrorCode, ErrorReport, Result};
pub use pprod::{PProdRef, PProdTable};
pub use term::{BvOp, Term, TermRef, TermTable};
pub use types::{Cardinality, Type, TypeRef, TypeTable};
