// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod arith;
mod bvarith;
mod bvlogic;
mod pool;

pub use arith::{ArithBuffer, Monomial};
pub use bvarith::{BvArith64Buffer, BvArithBuffer, BvArithWideBuffer, BvCoeff, BvMonomial};
pub use bvlogic::BvLogicBuffer;
pub use pool::{BufferRef, Pool, ScratchBuffer};
