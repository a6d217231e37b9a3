//! Specifier canonicalization.
//!
//! C lets one type be spelled many ways: `short`, `signed short` and
//! `signed short int` all denote the same type. A single walk over the
//! specifier chain folds duplicate qualifier nodes into one (promoting
//! to `const volatile` on a mixed set), rejects multiple storage
//! classes, and runs a small state machine over the type-specifier
//! tokens in spelling order. Consumed tokens are unlinked from the
//! chain; only the first type-specifier node survives, its opcode
//! rewritten to one of:
//!
//! ```text
//! void
//! char, signed char, unsigned char
//! short, unsigned short
//! int, unsigned
//! long, unsigned long
//! struct, union, enum, typedef-name
//! ```
//!
//! Chains that are already canonical pass through untouched, so running
//! the analysis twice is a no-op.

use crate::ast::{Arena, Op, TypeExpRef};
use crate::error::SemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Char,
    Size,
    Sign,
    Int,
    SizeSign,
    SizeInt,
    SignSize,
    SignInt,
    IntSign,
    IntSize,
    End,
}

/// Canonicalize the specifier chain starting at `head`.
pub fn analyze_decl_specs(arena: &mut Arena, head: TypeExpRef) -> Result<(), SemaError> {
    let mut state = State::Start;
    let mut scs: Option<TypeExpRef> = None;
    let mut first_tq: Option<TypeExpRef> = None;
    let mut first_ts: Option<TypeExpRef> = None;
    let mut prev: Option<TypeExpRef> = None;
    let mut d = Some(head);

    loop {
        // Fold storage classes and qualifiers up to the next
        // type-specifier token.
        while let Some(r) = d {
            let op = arena[r].op;
            if op.is_type_spec() {
                break;
            }
            let mut del_node = false;
            if op.is_storage_class() {
                if scs.is_none() {
                    scs = Some(r);
                } else {
                    return Err(SemaError::DupStorageClass {
                        loc: arena[r].loc.clone(),
                    });
                }
            } else if op.is_type_qualifier() {
                match first_tq {
                    None => first_tq = Some(r),
                    Some(tq) => {
                        if arena[tq].op != op {
                            arena[tq].op = Op::ConstVolatile;
                        }
                        del_node = true;
                    }
                }
            }
            if del_node {
                // A duplicate qualifier implies an earlier one was
                // kept, so the walk has moved past at least one node.
                let p = match prev {
                    Some(p) => p,
                    None => unreachable!("duplicate qualifier at chain head"),
                };
                arena[p].child = arena[r].child;
                d = arena[r].child;
            } else {
                prev = Some(r);
                d = arena[r].child;
            }
        }

        let r = match d {
            Some(r) => r,
            None => {
                if state == State::Start {
                    return Err(SemaError::MissingTypeSpec {
                        loc: arena[head].loc.clone(),
                    });
                }
                return Ok(());
            }
        };

        if state == State::Start {
            state = match arena[r].op {
                Op::Char => State::Char,
                Op::Short | Op::Long => State::Size,
                Op::Signed => {
                    arena[r].op = Op::Int;
                    State::Sign
                }
                Op::Unsigned => State::Sign,
                Op::Int => State::Int,
                // void, aggregates, typedef names and opcodes that are
                // already canonical admit no further specifier tokens
                _ => State::End,
            };
            first_ts = Some(r);
            prev = Some(r);
            d = arena[r].child;
            continue;
        }

        let ts = match first_ts {
            Some(ts) => ts,
            None => unreachable!("specifier state machine ran past START with no head"),
        };
        let op = arena[r].op;
        let dup = SemaError::DupTypeSpec {
            loc: arena[r].loc.clone(),
        };
        match state {
            State::Char => match op {
                Op::Signed => {
                    state = State::End;
                    arena[ts].op = Op::SignedChar;
                }
                Op::Unsigned => {
                    state = State::End;
                    arena[ts].op = Op::UnsignedChar;
                }
                _ => return Err(dup),
            },
            State::Size => match op {
                Op::Signed | Op::Unsigned => {
                    state = State::SizeSign;
                    if op == Op::Unsigned {
                        arena[ts].op = if arena[ts].op == Op::Short {
                            Op::UnsignedShort
                        } else {
                            Op::UnsignedLong
                        };
                    }
                }
                Op::Int => state = State::SizeInt,
                _ => return Err(dup),
            },
            State::Sign => match op {
                Op::Short | Op::Long => {
                    state = State::SignSize;
                    arena[ts].op = match (arena[ts].op, op) {
                        (Op::Unsigned, Op::Short) => Op::UnsignedShort,
                        (Op::Unsigned, Op::Long) => Op::UnsignedLong,
                        (_, size) => size,
                    };
                }
                Op::Int => state = State::SignInt,
                Op::Char => {
                    state = State::End;
                    arena[ts].op = if arena[ts].op == Op::Unsigned {
                        Op::UnsignedChar
                    } else {
                        Op::SignedChar
                    };
                }
                _ => return Err(dup),
            },
            State::Int => match op {
                Op::Signed => state = State::IntSign,
                Op::Unsigned => {
                    state = State::IntSign;
                    arena[ts].op = Op::Unsigned;
                }
                Op::Short | Op::Long => {
                    state = State::IntSize;
                    arena[ts].op = op;
                }
                _ => return Err(dup),
            },
            State::SizeSign | State::SignSize => match op {
                Op::Int => state = State::End,
                _ => return Err(dup),
            },
            State::SizeInt | State::IntSize => match op {
                Op::Signed => state = State::End,
                Op::Unsigned => {
                    state = State::End;
                    arena[ts].op = if arena[ts].op == Op::Short {
                        Op::UnsignedShort
                    } else {
                        Op::UnsignedLong
                    };
                }
                _ => return Err(dup),
            },
            State::SignInt | State::IntSign => match op {
                Op::Short | Op::Long => {
                    state = State::End;
                    arena[ts].op = match (arena[ts].op, op) {
                        (Op::Unsigned, Op::Short) => Op::UnsignedShort,
                        (Op::Unsigned, Op::Long) => Op::UnsignedLong,
                        (_, size) => size,
                    };
                }
                _ => return Err(dup),
            },
            State::End => return Err(dup),
            State::Start => unreachable!(),
        }

        // The consumed token is excised; the head specifier carries the
        // rewritten opcode.
        let p = match prev {
            Some(p) => p,
            None => unreachable!("specifier consumed before the chain head"),
        };
        arena[p].child = arena[r].child;
        d = arena[p].child;
    }
}
