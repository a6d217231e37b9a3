//! Type-expression model.
//!
//! A declaration reaches the analyzer as two chains of [`TypeExp`]
//! nodes: the declaration specifiers (storage class, qualifiers, type
//! specifiers) and the declarator (an identifier wrapped in derived-type
//! constructors, outermost first). Nodes live in an [`Arena`] owned by
//! the translation unit and are addressed by [`TypeExpRef`] indices, so
//! the analyzer can mutate them in place (merging qualifiers, splicing
//! typedefs, completing array sizes), and two declarations that took
//! part in a composition end up sharing one size handle.

use std::ops::{Index, IndexMut};

use crate::loc::Loc;

/// Node opcodes.
///
/// Specifier chains use the storage-class, qualifier and type-specifier
/// opcodes; declarator chains use `Id`, the derived constructors and
/// `Ellipsis`. `Signed` only occurs before canonicalization,
/// `ConstVolatile` only after qualifier merging, and `Deleted` marks a
/// slot whose contents were spliced away; every walk skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // storage-class specifiers (C11 6.7.1)
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    // type qualifiers (C11 6.7.3)
    Const,
    Volatile,
    ConstVolatile,
    // type specifiers (C11 6.7.2)
    Void,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    Signed,
    Unsigned,
    Long,
    UnsignedLong,
    Struct,
    Union,
    Enum,
    TypedefName,
    // derived-type constructors (C11 6.7.6)
    Star,
    Subscript,
    Function,
    // declarator leaves
    Id,
    EnumConst,
    Ellipsis,
    // a cleared slot
    Deleted,
}

impl Op {
    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            Op::Typedef | Op::Extern | Op::Static | Op::Auto | Op::Register
        )
    }

    /// A qualifier as the parser spells it.
    pub fn is_type_qualifier(self) -> bool {
        matches!(self, Op::Const | Op::Volatile)
    }

    /// A qualifier, including the merged form.
    pub fn is_qualifier(self) -> bool {
        matches!(self, Op::Const | Op::Volatile | Op::ConstVolatile)
    }

    /// Any opcode the specifier canonicalizer accepts as a type
    /// specifier, canonical or not.
    pub fn is_type_spec(self) -> bool {
        self.is_canonical_type_spec() || matches!(self, Op::Signed)
    }

    /// One of the canonical type-specifier opcodes (plus `TypedefName`,
    /// which survives canonicalization and dies at splice time).
    pub fn is_canonical_type_spec(self) -> bool {
        matches!(
            self,
            Op::Void
                | Op::Char
                | Op::SignedChar
                | Op::UnsignedChar
                | Op::Short
                | Op::UnsignedShort
                | Op::Int
                | Op::Unsigned
                | Op::Long
                | Op::UnsignedLong
                | Op::Struct
                | Op::Union
                | Op::Enum
                | Op::TypedefName
        )
    }

    pub fn is_struct_union_enum(self) -> bool {
        matches!(self, Op::Struct | Op::Union | Op::Enum)
    }

    /// Keyword spelling used by diagnostics. Opcodes with no keyword
    /// render as the empty string.
    pub fn keyword(self) -> &'static str {
        match self {
            Op::Typedef => "typedef",
            Op::Extern => "extern",
            Op::Static => "static",
            Op::Auto => "auto",
            Op::Register => "register",
            Op::Const => "const",
            Op::Volatile => "volatile",
            Op::ConstVolatile => "const volatile",
            Op::Void => "void",
            Op::Char => "char",
            Op::SignedChar => "signed char",
            Op::UnsignedChar => "unsigned char",
            Op::Short => "short",
            Op::UnsignedShort => "unsigned short",
            Op::Int => "int",
            Op::Signed => "signed",
            Op::Unsigned => "unsigned",
            Op::Long => "long",
            Op::UnsignedLong => "unsigned long",
            Op::Struct => "struct",
            Op::Union => "union",
            Op::Enum => "enum",
            Op::Ellipsis => "...",
            Op::TypedefName
            | Op::Star
            | Op::Subscript
            | Op::Function
            | Op::Id
            | Op::EnumConst
            | Op::Deleted => "",
        }
    }
}

/// Handle to a [`TypeExp`] in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeExpRef(u32);

/// Handle to a parser-owned constant expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprRef(u32);

/// A constant expression produced by the parser. The analyzer never
/// evaluates these; array composition only moves the handles around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub value: i64,
}

/// Per-opcode payload, one slot per node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    None,
    /// Qualifier slot of a `Star` node.
    Qual(Op),
    /// Array size on `Subscript`; initializer on `Id`.
    Expr(ExprRef),
    /// Parameters on `Function`; member declarations on `Struct` and
    /// `Union` (absent payload means the tag is incomplete).
    Decls(DeclList),
    /// Enumerators on `Enum` (absent payload means incomplete).
    Enums(Vec<TypeExpRef>),
}

/// One layer of a C type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExp {
    pub op: Op,
    /// Identifier, tag or typedef-name spelling.
    pub name: Option<String>,
    pub loc: Loc,
    /// The next-inner layer of the chain.
    pub child: Option<TypeExpRef>,
    /// The next declarator of a struct-declarator list.
    pub sibling: Option<TypeExpRef>,
    pub attr: Attr,
}

impl TypeExp {
    pub fn new(op: Op) -> TypeExp {
        TypeExp {
            op,
            name: None,
            loc: Loc::none(),
            child: None,
            sibling: None,
            attr: Attr::None,
        }
    }

    pub fn named(op: Op, name: impl Into<String>) -> TypeExp {
        TypeExp {
            name: Some(name.into()),
            ..TypeExp::new(op)
        }
    }

    pub fn at(mut self, loc: Loc) -> TypeExp {
        self.loc = loc;
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> TypeExp {
        self.attr = attr;
        self
    }

    /// The qualifier of a pointer node, if any.
    pub fn qual(&self) -> Option<Op> {
        match self.attr {
            Attr::Qual(q) => Some(q),
            _ => None,
        }
    }

    /// The expression handle of a `Subscript` (size) or `Id`
    /// (initializer) node, if any.
    pub fn expr(&self) -> Option<ExprRef> {
        match self.attr {
            Attr::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// The declaration list of a `Function` (parameters) or
    /// `Struct`/`Union` (members) node.
    pub fn decls(&self) -> Option<&DeclList> {
        match &self.attr {
            Attr::Decls(d) => Some(d),
            _ => None,
        }
    }
}

/// One declaration: specifier chain plus optional declarator chain.
///
/// `idl` is absent for abstract declarators (casts, `sizeof`). An
/// ellipsis parameter is a `Declaration` whose `idl` is a single
/// `Ellipsis` node and whose specifier chain is one `Deleted` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub decl_specs: TypeExpRef,
    pub idl: Option<TypeExpRef>,
}

impl Declaration {
    pub fn new(decl_specs: TypeExpRef, idl: Option<TypeExpRef>) -> Declaration {
        Declaration { decl_specs, idl }
    }
}

/// Ordered declaration list: function parameters, aggregate members.
pub type DeclList = Vec<Declaration>;

/// The declaration part of a function definition. Bodies belong to
/// later passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncDef {
    pub decl_specs: TypeExpRef,
    pub header: TypeExpRef,
}

/// Owner of every type-expression node and constant expression of one
/// translation unit.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<TypeExp>,
    exprs: Vec<Expr>,
}

impl Arena {
    pub fn new() -> Arena {
        Arena::default()
    }

    pub fn alloc(&mut self, node: TypeExp) -> TypeExpRef {
        let r = TypeExpRef(self.nodes.len() as u32);
        self.nodes.push(node);
        r
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprRef {
        let r = ExprRef(self.exprs.len() as u32);
        self.exprs.push(expr);
        r
    }

    /// Allocate a child-linked chain, returning its head.
    pub fn chain<I: IntoIterator<Item = TypeExp>>(&mut self, nodes: I) -> Option<TypeExpRef> {
        let refs: Vec<TypeExpRef> = nodes.into_iter().map(|n| self.alloc(n)).collect();
        for pair in refs.windows(2) {
            self[pair[0]].child = Some(pair[1]);
        }
        refs.first().copied()
    }

    /// Iterate a child-linked chain starting at `head`.
    pub fn walk(&self, head: Option<TypeExpRef>) -> ChainIter<'_> {
        ChainIter { arena: self, next: head }
    }

    /// The storage-class node of a specifier chain, if any.
    pub fn storage_class(&self, chain: TypeExpRef) -> Option<TypeExpRef> {
        self.walk(Some(chain)).find(|&r| self[r].op.is_storage_class())
    }

    /// The type-specifier node of a canonicalized specifier chain.
    pub fn type_spec(&self, chain: TypeExpRef) -> Option<TypeExpRef> {
        self.walk(Some(chain))
            .find(|&r| self[r].op.is_canonical_type_spec())
    }

    /// The qualifier node of a specifier chain, if any.
    pub fn type_qual(&self, chain: TypeExpRef) -> Option<TypeExpRef> {
        self.walk(Some(chain)).find(|&r| self[r].op.is_qualifier())
    }

    /// Whether the outermost derived node of `declarator` makes it
    /// declare a function.
    pub fn is_function_declarator(&self, declarator: TypeExpRef) -> bool {
        self[declarator]
            .child
            .map_or(false, |c| self[c].op == Op::Function)
    }

    /// Deep-copy a declarator chain. Parameter declarators are copied
    /// recursively; parameter specifier chains stay shared with the
    /// original.
    ///
    /// Splicing uses this so that completing an array later never
    /// reaches back into a typedef definition.
    pub fn dup_declarator(&mut self, d: Option<TypeExpRef>) -> Option<TypeExpRef> {
        let d = d?;
        let mut node = self[d].clone();
        if let Attr::Decls(params) = &node.attr {
            let params = params.clone();
            let mut copied = Vec::with_capacity(params.len());
            for p in params {
                copied.push(Declaration {
                    decl_specs: p.decl_specs,
                    idl: self.dup_declarator(p.idl),
                });
            }
            node.attr = Attr::Decls(copied);
        }
        node.child = self.dup_declarator(node.child);
        Some(self.alloc(node))
    }
}

impl Index<TypeExpRef> for Arena {
    type Output = TypeExp;

    fn index(&self, r: TypeExpRef) -> &TypeExp {
        &self.nodes[r.0 as usize]
    }
}

impl IndexMut<TypeExpRef> for Arena {
    fn index_mut(&mut self, r: TypeExpRef) -> &mut TypeExp {
        &mut self.nodes[r.0 as usize]
    }
}

impl Index<ExprRef> for Arena {
    type Output = Expr;

    fn index(&self, r: ExprRef) -> &Expr {
        &self.exprs[r.0 as usize]
    }
}

/// Iterator over a child-linked chain.
pub struct ChainIter<'a> {
    arena: &'a Arena,
    next: Option<TypeExpRef>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = TypeExpRef;

    fn next(&mut self) -> Option<TypeExpRef> {
        let r = self.next?;
        self.next = self.arena[r].child;
        Some(r)
    }
}
