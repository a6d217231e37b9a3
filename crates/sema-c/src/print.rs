//! Human-readable rendering of types for diagnostics.

use crate::ast::{Arena, Declaration, Op};

/// Render a declaration's type the way diagnostics quote it: specifier
/// keywords in chain order (tag specifiers include their tag), then the
/// declarator unwound from the outside in. A pointer to an array or to
/// a function is parenthesized; array brackets stay empty.
///
/// ```
/// use sema_c::{Arena, Declaration, Op, TypeExp};
/// use sema_c::stringify_type_exp;
///
/// let mut arena = Arena::new();
/// let specs = arena.chain(vec![TypeExp::new(Op::Int)]).unwrap();
/// let decl = arena
///     .chain(vec![
///         TypeExp::named(Op::Id, "p"),
///         TypeExp::new(Op::Star),
///         TypeExp::new(Op::Subscript),
///     ])
///     .unwrap();
/// let d = Declaration::new(specs, Some(decl));
/// assert_eq!(stringify_type_exp(&arena, &d), "int (*)[]");
/// ```
pub fn stringify_type_exp(arena: &Arena, d: &Declaration) -> String {
    let mut specs = String::new();
    for r in arena.walk(Some(d.decl_specs)) {
        let node = &arena[r];
        if node.op == Op::Deleted {
            continue;
        }
        if !specs.is_empty() {
            specs.push(' ');
        }
        specs.push_str(node.op.keyword());
        if node.op.is_struct_union_enum() {
            if let Some(name) = &node.name {
                specs.push(' ');
                specs.push_str(name);
            }
        }
    }

    let mut out = String::new();
    for r in arena.walk(d.idl) {
        let node = &arena[r];
        match node.op {
            Op::Function => {
                out.push('(');
                if let Some(params) = node.decls() {
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&stringify_type_exp(arena, p));
                    }
                }
                out.push(')');
            }
            Op::Subscript => out.push_str("[]"),
            Op::Star => {
                let qual = node.qual().map(Op::keyword).unwrap_or("");
                let nested = node
                    .child
                    .map_or(false, |c| matches!(arena[c].op, Op::Subscript | Op::Function));
                out = if nested {
                    format!("(*{}{})", qual, out)
                } else {
                    format!("*{}{}", qual, out)
                };
            }
            Op::Ellipsis => out = "...".to_string(),
            _ => {}
        }
    }

    match (specs.is_empty(), out.is_empty()) {
        (_, true) => specs,
        (true, _) => out,
        _ => format!("{} {}", specs, out),
    }
}
