//! Fatal diagnostics.
//!
//! Every error aborts analysis of the translation unit; downstream
//! passes must never see a declaration that failed here. The driver is
//! expected to print the rendered message and exit non-zero.

use thiserror::Error;

use crate::loc::Loc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemaError {
    // specifier misuse
    #[error("{loc}: error: more than one storage class specifier")]
    DupStorageClass { loc: Loc },
    #[error("{loc}: error: more than one type specifier")]
    DupTypeSpec { loc: Loc },
    #[error("{loc}: error: missing type specifier")]
    MissingTypeSpec { loc: Loc },
    #[error("{loc}: error: invalid storage class specifier in parameter declaration")]
    ParamStorageClass { loc: Loc },
    #[error("{loc}: error: invalid storage class '{kw}' in function definition")]
    FuncDefStorageClass { loc: Loc, kw: &'static str },
    #[error("{loc}: error: file-scope declaration of '{name}' specifies '{kw}'")]
    FileScopeStorageClass {
        loc: Loc,
        name: String,
        kw: &'static str,
    },

    // declarator shape
    #[error("{loc}: error: array of functions")]
    ArrayOfFunctions { loc: Loc },
    #[error("{loc}: error: array has incomplete element type")]
    IncompleteElementType { loc: Loc },
    #[error("{loc}: error: function returning a function")]
    FunctionReturningFunction { loc: Loc },
    #[error("{loc}: error: function returning an array")]
    FunctionReturningArray { loc: Loc },
    #[error("{loc}: error: 'void' must be the first and only parameter")]
    VoidNotOnlyParameter { loc: Loc },
    #[error("{loc}: error: member '{name}' declared as a function")]
    MemberFunction { loc: Loc, name: String },
    #[error("{loc}: error: member '{name}' has incomplete type")]
    MemberIncomplete { loc: Loc, name: String },
    #[error("{loc}: error: duplicate member '{name}'")]
    DuplicateMember { loc: Loc, name: String },

    // redeclaration
    #[error("{loc}: error: redeclaration of '{name}' with no linkage")]
    RedeclNoLinkage { loc: Loc, name: String },
    #[error("{loc}: error: declaration of '{name}' with no linkage follows extern declaration")]
    NoLinkageAfterExtern { loc: Loc, name: String },
    #[error("{loc}: error: extern declaration of '{name}' follows declaration with no linkage")]
    ExternAfterNoLinkage { loc: Loc, name: String },
    #[error("{loc}: error: static declaration of '{name}' follows non-static declaration")]
    StaticAfterNonStatic { loc: Loc, name: String },
    #[error("{loc}: error: non-static declaration of '{name}' follows static declaration")]
    NonStaticAfterStatic { loc: Loc, name: String },
    #[error("{loc}: error: '{name}' redeclared as different kind of symbol")]
    DifferentSymbolKind { loc: Loc, name: String },
    #[error("{loc}: error: redefinition of '{name}'")]
    Redefinition { loc: Loc, name: String },
    #[error("{loc}: error: redefinition of typedef '{name}'")]
    TypedefRedefinition { loc: Loc, name: String },
    #[error("{loc}: error: redeclaration of enumerator '{name}'")]
    EnumeratorRedeclaration { loc: Loc, name: String },
    #[error(
        "{loc}: error: conflicting types for '{name}'\n\
         => previously declared with type '{prev_ty}'\n\
         => now declared with type '{new_ty}'"
    )]
    ConflictingTypes {
        loc: Loc,
        name: String,
        prev_ty: String,
        new_ty: String,
    },

    // initializers and definitions
    #[error("{loc}: error: trying to initialize function type")]
    InitializedFunction { loc: Loc },
    #[error("{loc}: error: trying to initialize typedef")]
    InitializedTypedef { loc: Loc },
    #[error("{loc}: error: 'extern' variable cannot have an initializer")]
    InitializedExtern { loc: Loc },
    #[error("{loc}: error: function '{name}' declared in block scope cannot have '{kw}' storage class")]
    BlockScopeFunctionStorage {
        loc: Loc,
        name: String,
        kw: &'static str,
    },
    #[error("{loc}: error: declarator of function definition does not specify a function type")]
    NotAFunctionDeclarator { loc: Loc },
    #[error("{loc}: error: return type is an incomplete type")]
    IncompleteReturnType { loc: Loc },
    #[error("{loc}: error: missing parameter name in function definition")]
    MissingParameterName { loc: Loc },
    #[error("{loc}: error: parameter '{name}' has incomplete type")]
    IncompleteParameter { loc: Loc, name: String },

    // environment
    #[error("too many nested scopes")]
    TooManyScopes,
}
