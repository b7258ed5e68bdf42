// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

/// Hard limits and initial table capacities of a [`crate::Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// largest bit-vector width accepted by any constructor
    pub max_bvsize: u32,
    /// largest number of arguments of n-ary terms and tuple/function types
    pub max_arity: u32,
    /// largest total degree of a power product
    pub max_degree: u32,
    /// largest number of variables bound by one quantifier
    pub max_vars: u32,
    pub type_capacity: usize,
    pub term_capacity: usize,
    pub pprod_capacity: usize,
    pub node_capacity: usize,
    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_bvsize: u32::MAX >> 4,
            max_arity: u32::MAX >> 3,
            max_degree: u32::MAX >> 1,
            max_vars: u32::MAX >> 3,
            type_capacity: 64,
            term_capacity: 1024,
            pprod_capacity: 64,
            node_capacity: 256,
            buffer_capacity: 4,
        }
    }
}

impl Config {
    pub fn with_max_bvsize(mut self, n: u32) -> Self {
        self.max_bvsize = n;
        self
    }

    pub fn with_max_arity(mut self, n: u32) -> Self {
        self.max_arity = n;
        self
    }

    pub fn with_max_degree(mut self, d: u32) -> Self {
        self.max_degree = d;
        self
    }

    pub fn with_max_vars(mut self, n: u32) -> Self {
        self.max_vars = n;
        self
    }

    pub fn with_term_capacity(mut self, n: usize) -> Self {
        self.term_capacity = n;
        self
    }

    pub fn with_type_capacity(mut self, n: usize) -> Self {
        self.type_capacity = n;
        self
    }
}
