//! Typedef splicing.
//!
//! A declaration whose type specifier is a typedef name is rewritten so
//! that no later pass ever sees the alias: the specifier node takes
//! over the aliased base type, a copy of the typedef's declarator chain
//! is grafted onto the innermost end of the user's declarator, and
//! qualifiers migrate to wherever C says they now belong.

use crate::ast::{Arena, Attr, Declaration, Op, TypeExp, TypeExpRef};
use crate::sema::scope::Scopes;

/// Splice the aliased type into `decl` if its type specifier is a
/// typedef name. The parser has already established that the name
/// resolves to a visible `typedef` symbol.
pub(crate) fn replace_typedef_name(scopes: &mut Scopes, arena: &mut Arena, decl: &mut Declaration) {
    let ts = match arena.type_spec(decl.decl_specs) {
        Some(ts) => ts,
        None => unreachable!("declaration specifiers carry no type specifier"),
    };
    if arena[ts].op != Op::TypedefName {
        return;
    }
    let name = match &arena[ts].name {
        Some(name) => name.clone(),
        None => unreachable!("typedef-name node has no spelling"),
    };
    let sym = match scopes.lookup(&name, true) {
        Some(sym) => sym,
        None => unreachable!("typedef name not in scope"),
    };
    log::trace!("splicing typedef '{}'", name);

    // The typedef-name node takes over the opcode and payload of the
    // typedef's own type specifier; its child link and source location
    // stay with the use site.
    let src = match arena.type_spec(sym.decl_specs) {
        Some(src) => src,
        None => unreachable!("typedef definition carries no type specifier"),
    };
    let (src_op, src_name, src_attr) = {
        let node = &arena[src];
        (node.op, node.name.clone(), node.attr.clone())
    };
    arena[ts].op = src_op;
    arena[ts].name = src_name;
    arena[ts].attr = src_attr;

    // Graft a copy of the typedef's declarator chain onto the innermost
    // end of the user's declarator. The copy matters: a later
    // composition may complete an array size, and that must not reach
    // back into the typedef definition.
    let mut grafted: Option<TypeExpRef> = None;
    let alias_chain = arena[sym.declarator].child;
    if alias_chain.is_some() {
        let dup = arena.dup_declarator(alias_chain);
        match decl.idl {
            Some(mut tail) => {
                while let Some(c) = arena[tail].child {
                    tail = c;
                }
                arena[tail].child = dup;
            }
            None => decl.idl = dup,
        }
        grafted = dup;
    }

    // Rule one: a qualifier on the user's declaration attaches to a
    // spliced-in pointer instead of the base type (6.7.3#8 sends it
    // through any spliced-in arrays to their element type first). On a
    // spliced-in function type the qualifier is meaningless; drop it
    // with a warning.
    let user_tq = arena.type_qual(decl.decl_specs);
    if let (Some(tq), Some(head)) = (user_tq, grafted) {
        let target = match arena[head].op {
            Op::Star | Op::Function => Some(head),
            Op::Subscript => {
                let mut el = arena[head].child;
                while let Some(r) = el {
                    if arena[r].op != Op::Subscript {
                        break;
                    }
                    el = arena[r].child;
                }
                el.filter(|&r| matches!(arena[r].op, Op::Star | Op::Function))
            }
            _ => None,
        };
        match target {
            Some(t) if arena[t].op == Op::Function => {
                log::warn!(
                    "{}: warning: qualifier on function type '{}' has undefined behavior",
                    arena[t].loc,
                    name
                );
                arena[tq].op = Op::Deleted;
            }
            Some(t) => {
                let q = arena[tq].op;
                match arena[t].qual() {
                    None => arena[t].attr = Attr::Qual(q),
                    Some(existing) if existing != q => {
                        arena[t].attr = Attr::Qual(Op::ConstVolatile)
                    }
                    Some(_) => {}
                }
                arena[tq].op = Op::Deleted;
            }
            None => {}
        }
    }

    // Rule two: a qualifier on the typedef's own specifiers joins the
    // user's chain, reusing a slot rule one emptied when there is one.
    if let Some(sym_tq) = arena.type_qual(sym.decl_specs) {
        let q = arena[sym_tq].op;
        match user_tq {
            Some(tq) => {
                if arena[tq].op == Op::Deleted {
                    arena[tq].op = q;
                } else if arena[tq].op != q {
                    arena[tq].op = Op::ConstVolatile;
                }
            }
            None => {
                let mut tail = decl.decl_specs;
                while let Some(c) = arena[tail].child {
                    tail = c;
                }
                let fresh = arena.alloc(TypeExp::new(q));
                arena[tail].child = Some(fresh);
            }
        }
    }
}
