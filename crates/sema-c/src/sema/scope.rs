//! The scope stack.
//!
//! Two namespaces, ordinary identifiers and struct/union/enum tags,
//! each kept per nesting level. Level 0 is file scope.
//!
//! Popping a scope does not delete it immediately: the parser still
//! needs one lookahead query (typically `is_typedef_name`) against a
//! function's parameter scope while it consumes the trailing
//! punctuation, and may `restore` the scope outright when the parameter
//! list turns out to head a function body. Every other operation on the
//! stack consumes the pending pop before doing its own work.

use std::collections::HashMap;

use crate::ast::{Arena, Op, TypeExpRef};
use crate::error::SemaError;

/// Maximum block-scope nesting depth.
pub const MAX_NEST: usize = 16;

/// The file-scope nesting level.
pub const FILE_SCOPE: usize = 0;

/// An ordinary identifier installed in some scope.
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub decl_specs: TypeExpRef,
    pub declarator: TypeExpRef,
}

/// A struct/union/enum tag installed in some scope.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    pub ty: TypeExpRef,
}

#[derive(Debug)]
pub struct Scopes {
    ordinary: Vec<HashMap<String, Symbol>>,
    tags: Vec<HashMap<String, TypeTag>>,
    current: usize,
    pending_pop: bool,
}

impl Default for Scopes {
    fn default() -> Scopes {
        Scopes::new()
    }
}

impl Scopes {
    pub fn new() -> Scopes {
        Scopes {
            ordinary: vec![HashMap::new()],
            tags: vec![HashMap::new()],
            current: 0,
            pending_pop: false,
        }
    }

    pub fn current_level(&self) -> usize {
        self.current
    }

    fn flush(&mut self) {
        if self.pending_pop {
            self.delete_current();
        }
    }

    fn delete_current(&mut self) {
        log::trace!("deleting scope level {}", self.current);
        self.ordinary[self.current].clear();
        self.tags[self.current].clear();
        self.current -= 1;
        self.pending_pop = false;
    }

    pub fn push(&mut self) -> Result<(), SemaError> {
        self.flush();
        if self.current + 1 == MAX_NEST {
            return Err(SemaError::TooManyScopes);
        }
        self.current += 1;
        if self.ordinary.len() <= self.current {
            self.ordinary.push(HashMap::new());
            self.tags.push(HashMap::new());
        }
        log::trace!("pushed scope level {}", self.current);
        Ok(())
    }

    /// Mark the current level for deletion; the next stack operation
    /// carries it out.
    pub fn pop(&mut self) {
        self.flush();
        self.pending_pop = true;
    }

    /// Cancel a pending pop, keeping the level alive. Used when a
    /// parameter list turns out to belong to a function definition.
    pub fn restore(&mut self) {
        self.pending_pop = false;
    }

    /// Force the current level. A function definition's header is
    /// analyzed at file scope while its parameters stay in the scope the
    /// parser pushed for them.
    pub(crate) fn switch_to_level(&mut self, level: usize) {
        self.current = level;
        self.pending_pop = false;
    }

    pub fn lookup(&mut self, name: &str, all: bool) -> Option<Symbol> {
        self.flush();
        if all {
            for level in (0..=self.current).rev() {
                if let Some(sym) = self.ordinary[level].get(name) {
                    return Some(*sym);
                }
            }
            None
        } else {
            self.ordinary[self.current].get(name).copied()
        }
    }

    pub fn lookup_tag(&mut self, name: &str, all: bool) -> Option<TypeTag> {
        self.flush();
        if all {
            for level in (0..=self.current).rev() {
                if let Some(tag) = self.tags[level].get(name) {
                    return Some(*tag);
                }
            }
            None
        } else {
            self.tags[self.current].get(name).copied()
        }
    }

    /// Install a tag unconditionally: the grammar has already decided
    /// whether this spelling redeclares, completes or shadows. A
    /// same-level duplicate replaces the older entry.
    pub fn install_tag(&mut self, arena: &Arena, t: TypeExpRef) {
        self.flush();
        let name = match &arena[t].name {
            Some(name) => name.clone(),
            None => return, // anonymous aggregates are not installed
        };
        log::debug!("new tag '{}', scope {}", name, self.current);
        self.tags[self.current].insert(name, TypeTag { ty: t });
    }

    /// Install an ordinary identifier, diagnosing same-scope collisions.
    ///
    /// The only collisions C permits are a matching pair of function
    /// declarations and block-scope `extern` following `extern` (or
    /// following the original installation); everything else is one of
    /// the redeclaration errors.
    pub fn install(
        &mut self,
        arena: &Arena,
        decl_specs: TypeExpRef,
        declarator: TypeExpRef,
    ) -> Result<(), SemaError> {
        self.flush();
        let name = match &arena[declarator].name {
            Some(name) => name.clone(),
            None => return Ok(()), // nothing to key an unnamed declarator on
        };

        let prev = match self.ordinary[self.current].get(&name) {
            None => {
                log::debug!("install '{}', scope {}", name, self.current);
                self.ordinary[self.current]
                    .insert(name, Symbol { decl_specs, declarator });
                return Ok(());
            }
            Some(prev) => *prev,
        };

        let loc = arena[declarator].loc.clone();
        let curr_scs = arena.storage_class(decl_specs).map(|r| arena[r].op);
        let prev_scs = arena.storage_class(prev.decl_specs).map(|r| arena[r].op);
        let curr_op = arena[declarator].op;
        let prev_op = arena[prev.declarator].op;

        if curr_op == Op::EnumConst || curr_scs == Some(Op::Typedef) {
            // clash while installing an enumeration constant or typedef
            if curr_op == Op::EnumConst && prev_op == Op::EnumConst {
                return Err(SemaError::EnumeratorRedeclaration { loc, name });
            }
            if curr_scs == Some(Op::Typedef) && prev_scs == Some(Op::Typedef) {
                return Err(SemaError::TypedefRedefinition { loc, name });
            }
            return Err(SemaError::DifferentSymbolKind { loc, name });
        }
        if prev_op == Op::EnumConst || prev_scs == Some(Op::Typedef) {
            // clash with a previously declared constant or typedef
            return Err(SemaError::DifferentSymbolKind { loc, name });
        }
        if self.current != FILE_SCOPE {
            let curr_func = arena.is_function_declarator(declarator);
            let prev_func = arena.is_function_declarator(prev.declarator);
            if curr_func || prev_func {
                if curr_func != prev_func {
                    return Err(SemaError::DifferentSymbolKind { loc, name });
                }
                return Ok(()); // two declarations of the same function
            }

            let curr_extern = curr_scs == Some(Op::Extern);
            let prev_extern = prev_scs == Some(Op::Extern);
            if !curr_extern {
                if !prev_extern {
                    return Err(SemaError::RedeclNoLinkage { loc, name });
                }
                return Err(SemaError::NoLinkageAfterExtern { loc, name });
            }
            if !prev_extern {
                return Err(SemaError::ExternAfterNoLinkage { loc, name });
            }
        }
        Ok(())
    }
}
