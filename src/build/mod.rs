// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Constructors and queries on [`crate::Context`]. Every public constructor checks its
//! arguments first and only then touches the tables.

mod arith;
mod bits;
mod boolean;
mod buffers;
mod bv;
mod eq;
mod funs;
mod ite;
mod names;
mod types;
