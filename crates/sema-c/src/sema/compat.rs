//! Structural type compatibility and composition.
//!
//! Two declarations of the same external identifier must denote
//! compatible types, and comparing them also *composes* them: an array
//! whose size one side knows completes the other side in place, which
//! is how `extern int x[];` picks up the `10` from a later
//! `int x[10];`.

use crate::ast::{Arena, Attr, Declaration, Op, TypeExpRef};
use crate::error::SemaError;
use crate::print::stringify_type_exp;

/// Compare the base types of two specifier chains. Tagged specifiers
/// must agree on the tag spelling; with `qualified`, the qualifier
/// nodes must agree in presence and opcode.
pub fn compare_decl_specs(
    arena: &Arena,
    ds1: TypeExpRef,
    ds2: TypeExpRef,
    qualified: bool,
) -> bool {
    let (t1, t2) = match (arena.type_spec(ds1), arena.type_spec(ds2)) {
        (Some(t1), Some(t2)) => (t1, t2),
        _ => return false,
    };
    if arena[t1].op != arena[t2].op {
        return false;
    }
    if arena[t1].op.is_struct_union_enum() && arena[t1].name != arena[t2].name {
        return false;
    }
    if qualified {
        let q1 = arena.type_qual(ds1).map(|r| arena[r].op);
        let q2 = arena.type_qual(ds2).map(|r| arena[r].op);
        if q1 != q2 {
            log::trace!("type qualifiers conflict");
            return false;
        }
    }
    true
}

/// Copy the known size of one array layer to the other. Afterwards both
/// declarations share the one size expression.
pub fn complete_array(arena: &mut Arena, a: TypeExpRef, b: TypeExpRef) {
    match (arena[a].expr(), arena[b].expr()) {
        (None, Some(e)) => arena[a].attr = Attr::Expr(e),
        (Some(e), None) => arena[b].attr = Attr::Expr(e),
        _ => {}
    }
}

/// Whether the two declarations denote compatible types, walking both
/// declarator chains in lockstep and composing array sizes on the way.
///
/// Identifier nodes are skipped: names are not part of the type.
/// Parameter lists are compared pairwise with qualifiers ignored
/// (C11 6.7.6.3#15).
pub fn compare_and_compose(
    arena: &mut Arena,
    ds1: TypeExpRef,
    mut dct1: Option<TypeExpRef>,
    ds2: TypeExpRef,
    mut dct2: Option<TypeExpRef>,
    qualified: bool,
) -> bool {
    if let Some(r) = dct1 {
        if arena[r].op == Op::Id {
            dct1 = arena[r].child;
        }
    }
    if let Some(r) = dct2 {
        if arena[r].op == Op::Id {
            dct2 = arena[r].child;
        }
    }

    let (d1, d2) = match (dct1, dct2) {
        (None, None) => return compare_decl_specs(arena, ds1, ds2, qualified),
        (Some(d1), Some(d2)) => (d1, d2),
        _ => return false,
    };
    if arena[d1].op != arena[d2].op {
        return false;
    }

    match arena[d1].op {
        Op::Ellipsis => return true,
        Op::Star => {
            if qualified && arena[d1].qual() != arena[d2].qual() {
                return false;
            }
        }
        Op::Subscript => {
            complete_array(arena, d1, d2);
        }
        Op::Function => {
            let p1 = arena[d1].decls().cloned().unwrap_or_default();
            let p2 = arena[d2].decls().cloned().unwrap_or_default();
            if p1.len() != p2.len() {
                return false;
            }
            for (a, b) in p1.iter().zip(&p2) {
                if !compare_and_compose(arena, a.decl_specs, a.idl, b.decl_specs, b.idl, false) {
                    return false;
                }
            }
        }
        _ => {}
    }

    let c1 = arena[d1].child;
    let c2 = arena[d2].child;
    compare_and_compose(arena, ds1, c1, ds2, c2, true)
}

/// Require compatibility between a prior and a new declaration of the
/// same identifier, rendering both types for the diagnostic when they
/// conflict.
pub(crate) fn enforce_compatibility(
    arena: &mut Arena,
    prev_ds: TypeExpRef,
    prev_dct: TypeExpRef,
    ds: TypeExpRef,
    dct: TypeExpRef,
) -> Result<(), SemaError> {
    if compare_and_compose(arena, prev_ds, Some(prev_dct), ds, Some(dct), true) {
        return Ok(());
    }
    let prev_ty = stringify_type_exp(arena, &Declaration::new(prev_ds, Some(prev_dct)));
    let new_ty = stringify_type_exp(arena, &Declaration::new(ds, Some(dct)));
    Err(SemaError::ConflictingTypes {
        loc: arena[dct].loc.clone(),
        name: arena[dct].name.clone().unwrap_or_default(),
        prev_ty,
        new_ty,
    })
}
