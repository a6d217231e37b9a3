//! Declaration semantics for a C89/C99 compiler front-end.
//!
//! The parser hands this crate raw declaration trees; the analyses here
//! validate them, reduce the many spellings of each type to one
//! canonical form, splice typedef aliases into declarators, track
//! identifiers across nested scopes, and enforce linkage and
//! type-compatibility rules across every declaration of the same
//! external identifier. Downstream passes receive the same trees,
//! canonicalized, alias-free and annotated with the final status of
//! every external identifier.
//!
//! Lexing, parsing, preprocessing, expression evaluation, code
//! generation and the driver all live elsewhere; the boundary is the
//! [`ast`] module's type-expression model and the entry points of
//! [`sema::AnalysisContext`].

pub mod ast;
pub mod error;
pub mod loc;
pub mod print;
pub mod sema;

#[cfg(test)]
mod tests;

pub use ast::{Arena, Attr, Declaration, DeclList, Expr, ExprRef, FuncDef, Op, TypeExp, TypeExpRef};
pub use error::SemaError;
pub use loc::Loc;
pub use print::stringify_type_exp;
pub use sema::extern_id::{ExtIdStatus, ExternId, ExternTable};
pub use sema::scope::{Symbol, TypeTag, FILE_SCOPE, MAX_NEST};
pub use sema::{analyze_decl_specs, AnalysisContext};
