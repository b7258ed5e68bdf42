// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Symbol Tables
//!
//! Maps names to handles. A name can be bound several times: the most recent binding is
//! visible and removing it makes the previous one visible again. Each handle additionally
//! remembers the first name it was given (its base name).

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub(crate) struct NameTable<H: Copy + Eq + Hash + Debug> {
    bindings: FxHashMap<String, Vec<H>>,
    base_names: FxHashMap<H, String>,
}

impl<H: Copy + Eq + Hash + Debug> Default for NameTable<H> {
    fn default() -> Self {
        Self {
            bindings: FxHashMap::default(),
            base_names: FxHashMap::default(),
        }
    }
}

impl<H: Copy + Eq + Hash + Debug> NameTable<H> {
    pub fn set(&mut self, name: &str, h: H) {
        tracing::debug!("bind {name} -> {h:?}");
        self.bindings.entry(name.to_string()).or_default().push(h);
        self.base_names
            .entry(h)
            .or_insert_with(|| name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<H> {
        self.bindings.get(name).and_then(|stack| stack.last().copied())
    }

    /// Removes the most recent binding of `name`.
    pub fn remove(&mut self, name: &str) {
        let Some(stack) = self.bindings.get_mut(name) else {
            return;
        };
        if let Some(h) = stack.pop() {
            tracing::debug!("unbind {name} -> {h:?}");
            let still_bound = stack.contains(&h);
            if stack.is_empty() {
                self.bindings.remove(name);
            }
            if !still_bound && self.base_names.get(&h).is_some_and(|n| n == name) {
                self.base_names.remove(&h);
            }
        }
    }

    pub fn base_name(&self, h: H) -> Option<&str> {
        self.base_names.get(&h).map(|s| s.as_str())
    }

    /// Removes the base name of `h` and its binding to `h`.
    pub fn clear(&mut self, h: H) {
        let Some(name) = self.base_names.remove(&h) else {
            return;
        };
        if let Some(stack) = self.bindings.get_mut(&name) {
            if let Some(pos) = stack.iter().rposition(|x| *x == h) {
                stack.remove(pos);
            }
            if stack.is_empty() {
                self.bindings.remove(&name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_binding_wins_and_removal_restores() {
        let mut names: NameTable<u32> = NameTable::default();
        names.set("x", 1);
        names.set("x", 2);
        assert_eq!(names.get("x"), Some(2));
        assert_eq!(names.base_name(1), Some("x"));
        assert_eq!(names.base_name(2), Some("x"));
        names.remove("x");
        assert_eq!(names.get("x"), Some(1));
        assert_eq!(names.base_name(2), None);
        names.remove("x");
        assert_eq!(names.get("x"), None);
    }

    #[test]
    fn clear_drops_base_name() {
        let mut names: NameTable<u32> = NameTable::default();
        names.set("a", 7);
        names.set("b", 7);
        assert_eq!(names.base_name(7), Some("a"));
        names.clear(7);
        assert_eq!(names.base_name(7), None);
        assert_eq!(names.get("a"), None);
        // other names stay
        assert_eq!(names.get("b"), Some(7));
    }
}
