// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Context
//!
//! Owns every table, buffer pool and the error slot. All constructors are methods on
//! [`Context`]. Handles are only meaningful for the context that issued them.

use crate::bitnodes::NodeTable;
use crate::buffers::*;
use crate::config::Config;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::names::NameTable;
use crate::pprod::PProdTable;
use crate::term::{Term, TermRef, TermTable};
use crate::types::{TypeRef, TypeTable};
use std::ops::Index;

#[derive(Debug)]
pub struct Context {
    pub(crate) config: Config,
    pub(crate) types: TypeTable,
    pub(crate) terms: TermTable,
    pub(crate) pprods: PProdTable,
    pub(crate) nodes: NodeTable,
    pub(crate) arith_buffers: Pool<ArithBuffer>,
    pub(crate) bv64_buffers: Pool<BvArith64Buffer>,
    pub(crate) bv_buffers: Pool<BvArithWideBuffer>,
    pub(crate) logic_buffers: Pool<BvLogicBuffer>,
    pub(crate) type_names: NameTable<TypeRef>,
    pub(crate) term_names: NameTable<TermRef>,
    error: ErrorReport,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Context {
    pub fn new(config: Config) -> Self {
        tracing::debug!(
            "init context: {} types, {} terms, {} products, {} bit nodes, {} buffers per pool",
            config.type_capacity,
            config.term_capacity,
            config.pprod_capacity,
            config.node_capacity,
            config.buffer_capacity
        );
        Self {
            config,
            types: TypeTable::with_capacity(config.type_capacity),
            terms: TermTable::with_capacity(config.term_capacity),
            pprods: PProdTable::with_capacity(config.pprod_capacity),
            nodes: NodeTable::with_capacity(config.node_capacity),
            arith_buffers: Pool::with_capacity(config.buffer_capacity),
            bv64_buffers: Pool::with_capacity(config.buffer_capacity),
            bv_buffers: Pool::with_capacity(config.buffer_capacity),
            logic_buffers: Pool::with_capacity(config.buffer_capacity),
            type_names: NameTable::default(),
            term_names: NameTable::default(),
            error: ErrorReport::default(),
        }
    }

    /// Releases all tables. Every handle issued by this context becomes meaningless.
    pub fn teardown(self) {
        tracing::debug!(
            "teardown context: {} types, {} terms, {} products, {} bit nodes",
            self.types.len(),
            self.terms.len(),
            self.pprods.len(),
            self.nodes.len()
        );
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    pub fn pprods(&self) -> &PProdTable {
        &self.pprods
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    #[inline]
    pub fn get(&self, t: TermRef) -> &Term {
        self.terms.get(t)
    }

    /// Records `report` in the error slot and returns it as an error.
    pub(crate) fn fail<T>(&mut self, report: impl Into<ErrorReport>) -> Result<T> {
        let report = report.into();
        tracing::trace!("constructor failed: {report:?}");
        self.error = report.clone();
        Err(report)
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error.code
    }

    pub fn error_report(&self) -> &ErrorReport {
        &self.error
    }

    pub fn clear_error(&mut self) {
        self.error = ErrorReport::default();
    }

    /// Runs `f` with a scratch buffer that is returned to its pool afterwards.
    pub(crate) fn with_scratch<B: Pooled, R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut B) -> R,
    ) -> R {
        let (h, mut buffer) = B::pool(self).checkout();
        let out = f(self, &mut buffer);
        B::pool(self).checkin(h, buffer);
        out
    }

    /// Runs `f` on a buffer handed out through the public buffer API.
    pub(crate) fn with_buffer<B: Pooled, R>(
        &mut self,
        h: BufferRef<B>,
        f: impl FnOnce(&mut Self, &mut B) -> Result<R>,
    ) -> Result<R> {
        let Some(mut buffer) = B::pool(self).take(h) else {
            return self.fail(ErrorReport::new(ErrorCode::InvalidBuffer).badval(h.slot()));
        };
        let out = f(self, &mut buffer);
        B::pool(self).restore(h, buffer);
        out
    }
}

impl Index<TermRef> for Context {
    type Output = Term;

    #[inline]
    fn index(&self, t: TermRef) -> &Self::Output {
        self.get(t)
    }
}

/// Buffers that have a pool inside of [`Context`].
pub trait Pooled: ScratchBuffer + Sized {
    fn pool(ctx: &mut Context) -> &mut Pool<Self>;
}

impl Pooled for ArithBuffer {
    fn pool(ctx: &mut Context) -> &mut Pool<Self> {
        &mut ctx.arith_buffers
    }
}

impl Pooled for BvArith64Buffer {
    fn pool(ctx: &mut Context) -> &mut Pool<Self> {
        &mut ctx.bv64_buffers
    }
}

impl Pooled for BvArithWideBuffer {
    fn pool(ctx: &mut Context) -> &mut Pool<Self> {
        &mut ctx.bv_buffers
    }
}

impl Pooled for BvLogicBuffer {
    fn pool(ctx: &mut Context) -> &mut Pool<Self> {
        &mut ctx.logic_buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_buffers_are_recycled() {
        let mut ctx = Context::default();
        for _ in 0..3 {
            ctx.with_scratch(|_, b: &mut BvLogicBuffer| b.set_constant64(4, 3));
        }
        assert_eq!(ctx.logic_buffers.capacity(), 1);
        assert_eq!(ctx.logic_buffers.live(), 0);
    }

    #[test]
    fn error_slot_keeps_last_failure() {
        let mut ctx = Context::default();
        assert_eq!(ctx.error_code(), ErrorCode::NoError);
        let r: Result<()> = ctx.fail(ErrorCode::InvalidTerm);
        assert!(r.is_err());
        let r: Result<()> = ctx.fail(ErrorReport::new(ErrorCode::DegreeOverflow).badval(7));
        assert!(r.is_err());
        assert_eq!(ctx.error_code(), ErrorCode::DegreeOverflow);
        assert_eq!(ctx.error_report().badval, 7);
        ctx.clear_error();
        assert_eq!(ctx.error_code(), ErrorCode::NoError);
    }
}
