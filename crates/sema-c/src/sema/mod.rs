//! Semantic analysis of declarations.
//!
//! The parser drives this module declaration by declaration:
//! [`analyze_decl_specs`] canonicalizes a specifier chain,
//! [`AnalysisContext::analyze_declarator`] splices typedefs and
//! validates the derived type, and
//! [`AnalysisContext::analyze_init_declarator`] runs the linkage state
//! machine over every init-declarator. Parameters, struct members,
//! enumerators and function definitions have their own entry points
//! with the variations C gives them.

pub mod canon;
pub mod compat;
pub mod extern_id;
pub mod scope;
mod splice;

use std::collections::HashSet;

pub use canon::analyze_decl_specs;

use crate::ast::{Arena, Attr, Declaration, FuncDef, Op, TypeExp, TypeExpRef};
use crate::error::SemaError;
use extern_id::{ExtIdStatus, ExternId, ExternTable};
use scope::{Scopes, Symbol, TypeTag, FILE_SCOPE};

/// Per-translation-unit analysis state: the scope stack and the
/// external-identifier table. A fresh context starts both empty, so one
/// context per translation unit keeps the analyses re-entrant.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    scopes: Scopes,
    externs: ExternTable,
}

impl AnalysisContext {
    pub fn new() -> AnalysisContext {
        AnalysisContext {
            scopes: Scopes::new(),
            externs: ExternTable::new(),
        }
    }

    pub fn push_scope(&mut self) -> Result<(), SemaError> {
        self.scopes.push()
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop()
    }

    pub fn restore_scope(&mut self) {
        self.scopes.restore()
    }

    pub fn lookup(&mut self, name: &str, all: bool) -> Option<Symbol> {
        self.scopes.lookup(name, all)
    }

    pub fn lookup_tag(&mut self, name: &str, all: bool) -> Option<TypeTag> {
        self.scopes.lookup_tag(name, all)
    }

    pub fn install(
        &mut self,
        arena: &Arena,
        decl_specs: TypeExpRef,
        declarator: TypeExpRef,
    ) -> Result<(), SemaError> {
        self.scopes.install(arena, decl_specs, declarator)
    }

    pub fn install_tag(&mut self, arena: &Arena, tag: TypeExpRef) {
        self.scopes.install_tag(arena, tag)
    }

    /// Whether `name` is currently visible as a typedef name. The
    /// parser asks this to tell a declaration from an expression.
    pub fn is_typedef_name(&mut self, arena: &Arena, name: &str) -> bool {
        match self.scopes.lookup(name, true) {
            Some(sym) => {
                let scs = arena.storage_class(sym.decl_specs);
                matches!(scs.map(|r| arena[r].op), Some(Op::Typedef))
            }
            None => false,
        }
    }

    /// The external identifiers seen so far, with their statuses.
    pub fn extern_ids(&self) -> &ExternTable {
        &self.externs
    }

    /// Whether `tag` names a completed struct/union/enum. Anonymous
    /// aggregates are complete by construction; a tag that was never
    /// installed counts as incomplete.
    pub fn is_complete(&mut self, arena: &Arena, tag: Option<&str>) -> bool {
        let name = match tag {
            Some(name) => name,
            None => return true,
        };
        match self.scopes.lookup_tag(name, true) {
            Some(t) => match arena[t.ty].op {
                Op::Enum => matches!(arena[t.ty].attr, Attr::Enums(_)),
                _ => matches!(arena[t.ty].attr, Attr::Decls(_)),
            },
            None => false,
        }
    }

    fn incomplete_base(&mut self, arena: &Arena, ts: TypeExpRef) -> bool {
        let tag = arena[ts].name.clone();
        arena[ts].op.is_struct_union_enum() && !self.is_complete(arena, tag.as_deref())
    }

    /// Validate `declarator` against `decl_specs`: splice a typedef if
    /// one is named, check the derived-type shape, and optionally
    /// install the identifier in the current scope.
    ///
    /// Returns the declarator head: splicing replaces it when an absent
    /// abstract declarator gains the typedef's chain.
    pub fn analyze_declarator(
        &mut self,
        arena: &mut Arena,
        decl_specs: TypeExpRef,
        declarator: Option<TypeExpRef>,
        install: bool,
    ) -> Result<Option<TypeExpRef>, SemaError> {
        let mut d = Declaration::new(decl_specs, declarator);
        splice::replace_typedef_name(&mut self.scopes, arena, &mut d);
        self.examine_declarator(arena, decl_specs, d.idl)?;
        if install {
            if let Some(idl) = d.idl {
                self.scopes.install(arena, decl_specs, idl)?;
            }
        }
        Ok(d.idl)
    }

    /// Reject ill-formed derived types, layer by layer.
    fn examine_declarator(
        &mut self,
        arena: &Arena,
        decl_specs: TypeExpRef,
        declarator: Option<TypeExpRef>,
    ) -> Result<(), SemaError> {
        let r = match declarator {
            Some(r) => r,
            None => return Ok(()),
        };
        match arena[r].op {
            Op::Subscript => {
                // 6.7.6.2#1: the element type shall not be an
                // incomplete or function type
                match arena[r].child {
                    Some(c) => {
                        if arena[c].op == Op::Function {
                            return Err(SemaError::ArrayOfFunctions {
                                loc: arena[r].loc.clone(),
                            });
                        }
                        if arena[c].op == Op::Subscript && arena[c].expr().is_none() {
                            return Err(SemaError::IncompleteElementType {
                                loc: arena[r].loc.clone(),
                            });
                        }
                    }
                    None => {
                        let ts = match arena.type_spec(decl_specs) {
                            Some(ts) => ts,
                            None => unreachable!("specifier chain with no type specifier"),
                        };
                        if arena[ts].op == Op::Void || self.incomplete_base(arena, ts) {
                            return Err(SemaError::IncompleteElementType {
                                loc: arena[r].loc.clone(),
                            });
                        }
                    }
                }
            }
            Op::Function => {
                // 6.7.6.3#1: no function returning a function or array
                if let Some(c) = arena[r].child {
                    if arena[c].op == Op::Function {
                        return Err(SemaError::FunctionReturningFunction {
                            loc: arena[r].loc.clone(),
                        });
                    }
                    if arena[c].op == Op::Subscript {
                        return Err(SemaError::FunctionReturningArray {
                            loc: arena[r].loc.clone(),
                        });
                    }
                }
                // `void` can only be the whole parameter list
                if let Some(params) = arena[r].decls() {
                    for (i, p) in params.iter().enumerate() {
                        let is_void = arena
                            .type_spec(p.decl_specs)
                            .map_or(false, |ts| arena[ts].op == Op::Void);
                        if is_void && p.idl.is_none() && (i > 0 || params.len() > 1) {
                            return Err(SemaError::VoidNotOnlyParameter {
                                loc: arena[p.decl_specs].loc.clone(),
                            });
                        }
                    }
                }
            }
            _ => {}
        }
        let child = arena[r].child;
        self.examine_declarator(arena, decl_specs, child)
    }

    /// Run the linkage state machine over one init-declarator.
    pub fn analyze_init_declarator(
        &mut self,
        arena: &mut Arena,
        decl_specs: TypeExpRef,
        declarator: TypeExpRef,
        is_func_def: bool,
    ) -> Result<(), SemaError> {
        let is_func_decl = arena.is_function_declarator(declarator);
        let is_initialized = arena[declarator].expr().is_some();
        let storage = arena.storage_class(decl_specs).map(|r| arena[r].op);
        let name = arena[declarator].name.clone().unwrap_or_default();
        let loc = arena[declarator].loc.clone();

        // 6.7.9#3
        if is_initialized && is_func_decl {
            let floc = arena[declarator]
                .child
                .map(|c| arena[c].loc.clone())
                .unwrap_or(loc);
            return Err(SemaError::InitializedFunction { loc: floc });
        }
        // typedefs take no part in linkage
        if storage == Some(Op::Typedef) {
            if is_initialized {
                return Err(SemaError::InitializedTypedef { loc });
            }
            return Ok(());
        }

        if self.scopes.current_level() == FILE_SCOPE {
            // 6.9#2
            if matches!(storage, Some(Op::Auto) | Some(Op::Register)) {
                let scs = match arena.storage_class(decl_specs) {
                    Some(scs) => scs,
                    None => unreachable!(),
                };
                return Err(SemaError::FileScopeStorageClass {
                    loc: arena[scs].loc.clone(),
                    name,
                    kw: arena[scs].op.keyword(),
                });
            }

            let prev = self.externs.lookup(&name).copied();
            let prev = match prev {
                None => {
                    let status = if is_initialized || is_func_def {
                        ExtIdStatus::Defined
                    } else if is_func_decl || storage == Some(Op::Extern) {
                        ExtIdStatus::Referenced
                    } else {
                        ExtIdStatus::Tentative
                    };
                    self.externs.install(
                        &name,
                        ExternId {
                            decl_specs,
                            declarator,
                            status,
                        },
                    );
                    return Ok(());
                }
                Some(prev) => prev,
            };

            // 6.9#3: one external definition per identifier
            if is_initialized || is_func_def {
                if prev.status == ExtIdStatus::Defined {
                    return Err(SemaError::Redefinition { loc, name });
                }
                self.externs.set_status(&name, ExtIdStatus::Defined);
            }

            // linkage against the prior storage class
            let prev_storage = arena.storage_class(prev.decl_specs).map(|r| arena[r].op);
            match prev_storage {
                None => {
                    if storage == Some(Op::Static) {
                        return Err(SemaError::StaticAfterNonStatic { loc, name });
                    }
                }
                Some(Op::Extern) => {
                    if storage == Some(Op::Static) {
                        return Err(SemaError::StaticAfterNonStatic { loc, name });
                    }
                    if storage.is_none()
                        && !is_func_decl
                        && self.externs.status(&name) != Some(ExtIdStatus::Defined)
                    {
                        self.externs.set_status(&name, ExtIdStatus::Tentative);
                    }
                }
                Some(Op::Static) => {
                    if storage.is_none() && !is_func_decl {
                        return Err(SemaError::NonStaticAfterStatic { loc, name });
                    }
                }
                _ => {}
            }

            compat::enforce_compatibility(arena, prev.decl_specs, prev.declarator, decl_specs, declarator)
        } else {
            // 6.7.1#7: a block-scope function declaration may carry
            // `extern` at most
            if is_func_decl {
                if let Some(op) = storage {
                    if op != Op::Extern {
                        let floc = arena[declarator]
                            .child
                            .map(|c| arena[c].loc.clone())
                            .unwrap_or(loc);
                        return Err(SemaError::BlockScopeFunctionStorage {
                            loc: floc,
                            name,
                            kw: op.keyword(),
                        });
                    }
                }
            }

            if storage == Some(Op::Extern) || is_func_decl {
                // 6.7.9#5
                if is_initialized {
                    return Err(SemaError::InitializedExtern { loc });
                }
                match self.externs.lookup(&name).copied() {
                    None => {
                        self.externs.install(
                            &name,
                            ExternId {
                                decl_specs,
                                declarator,
                                status: ExtIdStatus::Referenced,
                            },
                        );
                        Ok(())
                    }
                    Some(prev) => compat::enforce_compatibility(
                        arena,
                        prev.decl_specs,
                        prev.declarator,
                        decl_specs,
                        declarator,
                    ),
                }
            } else {
                Ok(())
            }
        }
    }

    /// Validate one parameter declaration, install its name in the
    /// parameter scope, and adjust array and function parameters to
    /// pointers.
    pub fn analyze_parameter_declaration(
        &mut self,
        arena: &mut Arena,
        d: &mut Declaration,
    ) -> Result<(), SemaError> {
        // 6.7.6.3#2
        if let Some(scs) = arena.storage_class(d.decl_specs) {
            if arena[scs].op != Op::Register {
                return Err(SemaError::ParamStorageClass {
                    loc: arena[scs].loc.clone(),
                });
            }
        }

        splice::replace_typedef_name(&mut self.scopes, arena, d);
        let idl = match d.idl {
            Some(idl) => idl,
            None => return Ok(()),
        };
        self.examine_declarator(arena, d.decl_specs, Some(idl))?;

        let derived = if arena[idl].op == Op::Id {
            let derived = arena[idl].child;
            self.scopes.install(arena, d.decl_specs, idl)?;
            derived
        } else {
            Some(idl)
        };
        if let Some(p) = derived {
            match arena[p].op {
                Op::Subscript => {
                    // 6.7.6.3#7: array of T adjusts to pointer to T;
                    // the size expression is discarded
                    arena[p].op = Op::Star;
                    arena[p].attr = Attr::None;
                }
                Op::Function => {
                    // 6.7.6.3#8: function adjusts to pointer to
                    // function
                    let inner = arena[p].clone();
                    let inner = arena.alloc(inner);
                    arena[p].op = Op::Star;
                    arena[p].attr = Attr::None;
                    arena[p].child = Some(inner);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Install an enumeration constant. The node arrives from the
    /// parser with op `EnumConst` and the constant's spelling.
    pub fn analyze_enumerator(
        &mut self,
        arena: &mut Arena,
        e: TypeExpRef,
    ) -> Result<(), SemaError> {
        // 6.7.2.2#2: enumeration constants have type int
        let specs = arena.alloc(TypeExp::new(Op::Int));
        let marker = arena.alloc(TypeExp::new(Op::EnumConst));
        arena[e].child = Some(marker);
        self.scopes.install(arena, specs, e)
    }

    /// Analyze the declaration part of a function definition.
    ///
    /// The identifier belongs to file scope, so the context temporarily
    /// drops to level 0 for the header and returns to the parameter
    /// scope afterwards.
    pub fn analyze_function_definition(
        &mut self,
        arena: &mut Arena,
        f: &FuncDef,
    ) -> Result<(), SemaError> {
        // 6.9.1#2, checked before typedef splicing: a definition's
        // identifier may not inherit its function type from a typedef
        let func = match arena[f.header].child {
            Some(c) if arena[c].op == Op::Function => c,
            _ => {
                return Err(SemaError::NotAFunctionDeclarator {
                    loc: arena[f.header].loc.clone(),
                })
            }
        };

        self.scopes.switch_to_level(FILE_SCOPE);
        self.analyze_declarator(arena, f.decl_specs, Some(f.header), true)?;
        self.analyze_init_declarator(arena, f.decl_specs, f.header, true)?;
        self.scopes.switch_to_level(1);

        // 6.9.1#4
        if let Some(scs) = arena.storage_class(f.decl_specs) {
            let op = arena[scs].op;
            if op != Op::Extern && op != Op::Static {
                return Err(SemaError::FuncDefStorageClass {
                    loc: arena[scs].loc.clone(),
                    kw: op.keyword(),
                });
            }
        }

        // an underived return type must be complete
        if arena[func].child.is_none() {
            let ts = match arena.type_spec(f.decl_specs) {
                Some(ts) => ts,
                None => unreachable!("specifier chain with no type specifier"),
            };
            if self.incomplete_base(arena, ts) {
                return Err(SemaError::IncompleteReturnType {
                    loc: arena[ts].loc.clone(),
                });
            }
        }

        // 6.9.1#5: parameters must be named, except for a lone `void`;
        // 6.7.6.3#4: after adjustment they must be complete
        let params = arena[func].decls().cloned().unwrap_or_default();
        if let Some(first) = params.first() {
            let first_is_void = arena
                .type_spec(first.decl_specs)
                .map_or(false, |ts| arena[ts].op == Op::Void);
            if first_is_void && first.idl.is_none() {
                if params.len() > 1 {
                    return Err(SemaError::VoidNotOnlyParameter {
                        loc: arena[first.decl_specs].loc.clone(),
                    });
                }
                return Ok(());
            }
        }
        for p in &params {
            let idl = match p.idl {
                Some(idl) => idl,
                None => {
                    return Err(SemaError::MissingParameterName {
                        loc: arena[p.decl_specs].loc.clone(),
                    })
                }
            };
            if arena[idl].op == Op::Ellipsis {
                break;
            }
            if arena[idl].op != Op::Id {
                return Err(SemaError::MissingParameterName {
                    loc: arena[p.decl_specs].loc.clone(),
                });
            }
            if arena[idl].child.is_none() {
                let ts = match arena.type_spec(p.decl_specs) {
                    Some(ts) => ts,
                    None => unreachable!("specifier chain with no type specifier"),
                };
                if arena[ts].op == Op::Void || self.incomplete_base(arena, ts) {
                    return Err(SemaError::IncompleteParameter {
                        loc: arena[idl].loc.clone(),
                        name: arena[idl].name.clone().unwrap_or_default(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate one struct declarator: splice and shape checks, then
    /// the member rules of 6.7.2.1#2: no function members, no
    /// incomplete members.
    pub fn analyze_struct_declarator(
        &mut self,
        arena: &mut Arena,
        sql: TypeExpRef,
        declarator: TypeExpRef,
    ) -> Result<(), SemaError> {
        self.analyze_declarator(arena, sql, Some(declarator), false)?;
        let name = arena[declarator].name.clone().unwrap_or_default();
        let loc = arena[declarator].loc.clone();
        match arena[declarator].child {
            None => {
                let ts = match arena.type_spec(sql) {
                    Some(ts) => ts,
                    None => unreachable!("specifier chain with no type specifier"),
                };
                if self.incomplete_base(arena, ts) {
                    return Err(SemaError::MemberIncomplete { loc, name });
                }
            }
            Some(c) if arena[c].op == Op::Subscript => {
                // an array member cannot be missing its size
                if arena[c].expr().is_none() {
                    return Err(SemaError::MemberIncomplete { loc, name });
                }
            }
            Some(c) if arena[c].op == Op::Function => {
                return Err(SemaError::MemberFunction { loc, name });
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Diagnose the first duplicated member name in a struct/union
    /// declaration list. Declarators of one declaration chain through
    /// `sibling`.
    pub fn check_for_dup_member(
        &self,
        arena: &Arena,
        members: &[Declaration],
    ) -> Result<(), SemaError> {
        let mut seen = HashSet::new();
        for m in members {
            let mut dct = m.idl;
            while let Some(r) = dct {
                if let Some(name) = &arena[r].name {
                    if !seen.insert(name.clone()) {
                        return Err(SemaError::DuplicateMember {
                            loc: arena[r].loc.clone(),
                            name: name.clone(),
                        });
                    }
                }
                dct = arena[r].sibling;
            }
        }
        Ok(())
    }
}
