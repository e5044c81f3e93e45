//! Sample-function symbol table
//!
//! Lookups follow the lexical block chain, but declarations are checked
//! against every name used anywhere in the sample function. Shadowing is
//! therefore never allowed, so the same statements are valid for both
//! function-scoped and block-scoped target languages.

use protosample_common::{FieldShape, SampleError};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};

/// Hybrid symbol table: a flat universe plus a chain of block scopes
#[derive(Debug, Clone)]
pub struct ScopeTable {
    universe: HashSet<String>,
    scopes: Vec<HashMap<String, FieldShape>>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    /// Root scope of a new sample function
    pub fn new() -> Self {
        Self {
            universe: HashSet::new(),
            scopes: vec![HashMap::new()],
        }
    }

    /// Root scope with names that are taken but not visible to lookups
    pub fn with_reserved<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::new();
        table
            .universe
            .extend(reserved.into_iter().map(str::to_string));
        table
    }

    /// Declare `name` in the current scope
    ///
    /// Fails if the name was used anywhere in the function, in any scope.
    pub fn declare(&mut self, name: &str, shape: FieldShape) -> Result<(), SampleError> {
        if !self.universe.insert(name.to_string()) {
            return Err(SampleError::DuplicateName {
                name: name.to_string(),
            });
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), shape);
        }
        Ok(())
    }

    /// Find `name` in the nearest enclosing scope that declared it
    pub fn lookup(&self, name: &str) -> Option<&FieldShape> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Whether `name` is taken anywhere in the function
    pub fn is_used(&self, name: &str) -> bool {
        self.universe.contains(name)
    }

    /// Number of open scopes, the root included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open a child scope; it is closed when the guard drops
    pub fn enter_block(&mut self) -> BlockScope<'_> {
        self.scopes.push(HashMap::new());
        BlockScope { table: self }
    }

    /// A name close to `suggested` that is not yet used
    ///
    /// Collisions get a short suffix derived from `salt`, so the result is
    /// deterministic for the same sample content. The name is not declared.
    pub fn disambiguate(&self, suggested: &str, salt: &str) -> String {
        if !self.is_used(suggested) {
            return suggested.to_string();
        }

        let mut attempt = 0u32;
        loop {
            let candidate = format!("{}_{}", suggested, short_hash(salt, attempt));
            if !self.is_used(&candidate) {
                return candidate;
            }
            attempt += 1;
        }
    }
}

/// A block scope that pops itself when dropped
pub struct BlockScope<'a> {
    table: &'a mut ScopeTable,
}

impl Deref for BlockScope<'_> {
    type Target = ScopeTable;

    fn deref(&self) -> &ScopeTable {
        &*self.table
    }
}

impl DerefMut for BlockScope<'_> {
    fn deref_mut(&mut self) -> &mut ScopeTable {
        &mut *self.table
    }
}

impl Drop for BlockScope<'_> {
    fn drop(&mut self) {
        if self.table.scopes.len() > 1 {
            self.table.scopes.pop();
        }
    }
}

/// Six hex characters of SHA-256 over `salt` and `attempt`
pub(crate) fn short_hash(salt: &str, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(attempt.to_le_bytes());
    hasher.finalize()[..3]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
