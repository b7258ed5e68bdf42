// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
mod nodes;
mod table;

pub use nodes::{BvOp, Term, TermRef};
pub use table::TermTable;
