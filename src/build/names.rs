// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::context::Context;
use crate::error::Result;
use crate::term::TermRef;
use crate::types::TypeRef;

impl Context {
    /// Binds `name` to `tau`. The previous binding of `name` becomes visible again once this
    /// one is removed.
    pub fn set_type_name(&mut self, tau: TypeRef, name: &str) -> Result<()> {
        self.check_good_type(tau)?;
        self.type_names.set(name, tau);
        Ok(())
    }

    pub fn set_term_name(&mut self, t: TermRef, name: &str) -> Result<()> {
        self.check_good_term(t)?;
        self.term_names.set(name, t);
        Ok(())
    }

    pub fn remove_type_name(&mut self, name: &str) {
        self.type_names.remove(name);
    }

    pub fn remove_term_name(&mut self, name: &str) {
        self.term_names.remove(name);
    }

    pub fn get_type_by_name(&self, name: &str) -> Option<TypeRef> {
        self.type_names.get(name)
    }

    pub fn get_term_by_name(&self, name: &str) -> Option<TermRef> {
        self.term_names.get(name)
    }

    /// Drops the base name of `tau`.
    pub fn clear_type_name(&mut self, tau: TypeRef) -> Result<()> {
        self.check_good_type(tau)?;
        self.type_names.clear(tau);
        Ok(())
    }

    pub fn clear_term_name(&mut self, t: TermRef) -> Result<()> {
        self.check_good_term(t)?;
        self.term_names.clear(t);
        Ok(())
    }

    pub fn type_name(&self, tau: TypeRef) -> Option<&str> {
        self.type_names.base_name(tau)
    }

    pub fn term_name(&self, t: TermRef) -> Option<&str> {
        self.term_names.base_name(t)
    }
}
