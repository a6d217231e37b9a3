//! End-to-end tests driving the analyses the way a parser would.

use pretty_assertions::assert_eq;

use crate::ast::{Arena, Attr, Declaration, Expr, ExprRef, FuncDef, Op, TypeExp, TypeExpRef};
use crate::error::SemaError;
use crate::loc::Loc;
use crate::print::stringify_type_exp;
use crate::sema::extern_id::ExtIdStatus;
use crate::sema::{analyze_decl_specs, AnalysisContext};

fn specs(arena: &mut Arena, ops: &[Op]) -> TypeExpRef {
    let nodes: Vec<TypeExp> = ops.iter().map(|&op| TypeExp::new(op)).collect();
    arena.chain(nodes).unwrap()
}

fn typedef_name(arena: &mut Arena, name: &str) -> TypeExpRef {
    arena.chain(vec![TypeExp::named(Op::TypedefName, name)]).unwrap()
}

/// Declarator chain: identifier head plus derived layers, outermost
/// first.
fn dtor(arena: &mut Arena, name: &str, derived: Vec<TypeExp>) -> TypeExpRef {
    let mut nodes = vec![TypeExp::named(Op::Id, name)];
    nodes.extend(derived);
    arena.chain(nodes).unwrap()
}

fn array(size: Option<ExprRef>) -> TypeExp {
    match size {
        Some(e) => TypeExp::new(Op::Subscript).with_attr(Attr::Expr(e)),
        None => TypeExp::new(Op::Subscript),
    }
}

fn func(params: Vec<Declaration>) -> TypeExp {
    TypeExp::new(Op::Function).with_attr(Attr::Decls(params))
}

/// Run one whole declaration the way the parser drives the analyses.
fn declare(
    ctx: &mut AnalysisContext,
    arena: &mut Arena,
    ds: TypeExpRef,
    idl: TypeExpRef,
) -> Result<(), SemaError> {
    analyze_decl_specs(arena, ds)?;
    let idl = ctx.analyze_declarator(arena, ds, Some(idl), true)?.unwrap();
    ctx.analyze_init_declarator(arena, ds, idl, false)
}

// typedef int A; A x;
#[test]
fn typedef_alias_is_spliced_away() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let td = specs(&mut arena, &[Op::Typedef, Op::Int]);
    let a = dtor(&mut arena, "A", vec![]);
    declare(&mut ctx, &mut arena, td, a).unwrap();

    let ds = typedef_name(&mut arena, "A");
    let x = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds, x).unwrap();

    let ops: Vec<Op> = arena.walk(Some(ds)).map(|r| arena[r].op).collect();
    assert_eq!(ops, vec![Op::Int]);
    assert!(arena.walk(Some(ds)).all(|r| arena[r].op != Op::TypedefName));
    assert_eq!(arena[x].child, None);
    assert_eq!(ctx.extern_ids().status("x"), Some(ExtIdStatus::Tentative));
}

// unsigned short int x;
#[test]
fn specifier_chain_collapses_to_one_node() {
    let mut arena = Arena::new();
    let ds = specs(&mut arena, &[Op::Unsigned, Op::Short, Op::Int]);
    analyze_decl_specs(&mut arena, ds).unwrap();
    let chain: Vec<Op> = arena.walk(Some(ds)).map(|r| arena[r].op).collect();
    assert_eq!(chain, vec![Op::UnsignedShort]);
}

// typedef int *T; const T x;  =>  int *const x
#[test]
fn qualifier_migrates_onto_spliced_pointer() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let td = specs(&mut arena, &[Op::Typedef, Op::Int]);
    let t = dtor(&mut arena, "T", vec![TypeExp::new(Op::Star)]);
    declare(&mut ctx, &mut arena, td, t).unwrap();

    let ds = arena
        .chain(vec![TypeExp::new(Op::Const), TypeExp::named(Op::TypedefName, "T")])
        .unwrap();
    let x = dtor(&mut arena, "x", vec![]);
    analyze_decl_specs(&mut arena, ds).unwrap();
    let x = ctx.analyze_declarator(&mut arena, ds, Some(x), true).unwrap().unwrap();

    let star = arena[x].child.unwrap();
    assert_eq!(arena[star].op, Op::Star);
    assert_eq!(arena[star].qual(), Some(Op::Const));
    // the const node in the specifier chain was given up
    assert!(arena.type_qual(ds).is_none());
    assert_eq!(
        stringify_type_exp(&arena, &Declaration::new(ds, Some(x))),
        "int *const"
    );
}

// extern int a[]; int a[10];
#[test]
fn later_declaration_completes_the_array() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Extern, Op::Int]);
    let a1 = dtor(&mut arena, "a", vec![array(None)]);
    declare(&mut ctx, &mut arena, ds1, a1).unwrap();
    assert_eq!(ctx.extern_ids().status("a"), Some(ExtIdStatus::Referenced));

    let size = arena.alloc_expr(Expr { value: 10 });
    let ds2 = specs(&mut arena, &[Op::Int]);
    let a2 = dtor(&mut arena, "a", vec![array(Some(size))]);
    declare(&mut ctx, &mut arena, ds2, a2).unwrap();

    let sub1 = arena[a1].child.unwrap();
    let sub2 = arena[a2].child.unwrap();
    assert_eq!(arena[sub1].expr(), Some(size));
    assert_eq!(arena[sub1].expr(), arena[sub2].expr());
    assert_eq!(ctx.extern_ids().status("a"), Some(ExtIdStatus::Tentative));
}

// int x; static int x;
#[test]
fn static_after_non_static_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Int]);
    let x1 = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds1, x1).unwrap();

    let ds2 = specs(&mut arena, &[Op::Static, Op::Int]);
    let x2 = dtor(&mut arena, "x", vec![]);
    let err = declare(&mut ctx, &mut arena, ds2, x2).unwrap_err();
    assert!(matches!(err, SemaError::StaticAfterNonStatic { .. }));
    assert!(err
        .to_string()
        .contains("static declaration of 'x' follows non-static declaration"));
}

// { extern int y; int y; }
#[test]
fn block_scope_no_linkage_after_extern_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();
    ctx.push_scope().unwrap();

    let ds1 = specs(&mut arena, &[Op::Extern, Op::Int]);
    let y1 = dtor(&mut arena, "y", vec![]);
    declare(&mut ctx, &mut arena, ds1, y1).unwrap();

    let ds2 = specs(&mut arena, &[Op::Int]);
    let y2 = dtor(&mut arena, "y", vec![]);
    let err = declare(&mut ctx, &mut arena, ds2, y2).unwrap_err();
    assert!(err
        .to_string()
        .contains("declaration of 'y' with no linkage follows extern declaration"));
}

// enum E { A, A };
#[test]
fn enumerator_redeclaration_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let a1 = arena.alloc(TypeExp::named(Op::EnumConst, "A"));
    ctx.analyze_enumerator(&mut arena, a1).unwrap();

    let a2 = arena.alloc(TypeExp::named(Op::EnumConst, "A"));
    let err = ctx.analyze_enumerator(&mut arena, a2).unwrap_err();
    assert!(err.to_string().contains("redeclaration of enumerator 'A'"));
}

// int f(void, int);
#[test]
fn void_must_be_the_only_parameter() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let void_ds = specs(&mut arena, &[Op::Void]);
    let int_ds = specs(&mut arena, &[Op::Int]);
    let params = vec![
        Declaration::new(void_ds, None),
        Declaration::new(int_ds, None),
    ];
    let ds = specs(&mut arena, &[Op::Int]);
    let f = dtor(&mut arena, "f", vec![func(params)]);
    let err = ctx.analyze_declarator(&mut arena, ds, Some(f), true).unwrap_err();
    assert!(matches!(err, SemaError::VoidNotOnlyParameter { .. }));
    assert!(err
        .to_string()
        .contains("'void' must be the first and only parameter"));
}

// void f(int a[10]) { }  =>  parameter adjusts to int *a
#[test]
fn array_parameter_decays_to_pointer() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();
    ctx.push_scope().unwrap(); // parameter scope

    let size = arena.alloc_expr(Expr { value: 10 });
    let ds = specs(&mut arena, &[Op::Int]);
    let idl = dtor(&mut arena, "a", vec![array(Some(size))]);
    let mut d = Declaration::new(ds, Some(idl));
    ctx.analyze_parameter_declaration(&mut arena, &mut d).unwrap();

    let derived = arena[idl].child.unwrap();
    assert_eq!(arena[derived].op, Op::Star);
    assert_eq!(arena[derived].expr(), None);
    assert!(ctx.lookup("a", false).is_some());
}

// struct S { int m; int m; };
#[test]
fn duplicate_member_is_rejected() {
    let mut arena = Arena::new();
    let ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Int]);
    let m1 = dtor(&mut arena, "m", vec![]);
    let ds2 = specs(&mut arena, &[Op::Int]);
    let m2 = dtor(&mut arena, "m", vec![]);
    let members = vec![
        Declaration::new(ds1, Some(m1)),
        Declaration::new(ds2, Some(m2)),
    ];
    let err = ctx.check_for_dup_member(&arena, &members).unwrap_err();
    assert!(err.to_string().contains("duplicate member 'm'"));
}

#[test]
fn sibling_declarators_share_the_duplicate_check() {
    // struct S { int m, m; };
    let mut arena = Arena::new();
    let ctx = AnalysisContext::new();

    let ds = specs(&mut arena, &[Op::Int]);
    let m1 = dtor(&mut arena, "m", vec![]);
    let m2 = dtor(&mut arena, "m", vec![]);
    arena[m1].sibling = Some(m2);
    let members = vec![Declaration::new(ds, Some(m1))];
    assert!(ctx.check_for_dup_member(&arena, &members).is_err());
}

// typedef int A[]; extern A x; int x[10]; A y;
#[test]
fn completing_an_array_never_touches_the_typedef() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let td = specs(&mut arena, &[Op::Typedef, Op::Int]);
    let a = dtor(&mut arena, "A", vec![array(None)]);
    declare(&mut ctx, &mut arena, td, a).unwrap();

    let ds1 = specs(&mut arena, &[Op::Extern]);
    let ds1_tail = arena.alloc(TypeExp::named(Op::TypedefName, "A"));
    arena[ds1].child = Some(ds1_tail);
    let x1 = dtor(&mut arena, "x", vec![]);
    analyze_decl_specs(&mut arena, ds1).unwrap();
    let x1 = ctx.analyze_declarator(&mut arena, ds1, Some(x1), true).unwrap().unwrap();
    ctx.analyze_init_declarator(&mut arena, ds1, x1, false).unwrap();

    let size = arena.alloc_expr(Expr { value: 10 });
    let ds2 = specs(&mut arena, &[Op::Int]);
    let x2 = dtor(&mut arena, "x", vec![array(Some(size))]);
    declare(&mut ctx, &mut arena, ds2, x2).unwrap();

    // x picked up the size through composition
    let sub = arena[x1].child.unwrap();
    assert_eq!(arena[sub].expr(), Some(size));

    // but a fresh use of the typedef is still an incomplete array
    let ds3 = typedef_name(&mut arena, "A");
    let y = dtor(&mut arena, "y", vec![]);
    analyze_decl_specs(&mut arena, ds3).unwrap();
    let y = ctx.analyze_declarator(&mut arena, ds3, Some(y), true).unwrap().unwrap();
    let ysub = arena[y].child.unwrap();
    assert_eq!(arena[ysub].op, Op::Subscript);
    assert_eq!(arena[ysub].expr(), None);
}

// typedef const int T; T x;  =>  const int x
#[test]
fn typedef_qualifier_joins_the_user_chain() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let td = arena
        .chain(vec![
            TypeExp::new(Op::Typedef),
            TypeExp::new(Op::Const),
            TypeExp::new(Op::Int),
        ])
        .unwrap();
    analyze_decl_specs(&mut arena, td).unwrap();
    let t = dtor(&mut arena, "T", vec![]);
    ctx.analyze_declarator(&mut arena, td, Some(t), true).unwrap();
    ctx.analyze_init_declarator(&mut arena, td, t, false).unwrap();

    let ds = typedef_name(&mut arena, "T");
    let x = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds, x).unwrap();

    let qual = arena.type_qual(ds).unwrap();
    assert_eq!(arena[qual].op, Op::Const);
    assert_eq!(
        arena.type_spec(ds).map(|r| arena[r].op),
        Some(Op::Int)
    );
}

// typedef int F(void); const F f;  =>  warning, qualifier dropped
#[test]
fn qualifier_on_function_typedef_is_dropped() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let void_ds = specs(&mut arena, &[Op::Void]);
    let params = vec![Declaration::new(void_ds, None)];
    let td = specs(&mut arena, &[Op::Typedef, Op::Int]);
    let f = dtor(&mut arena, "F", vec![func(params)]);
    declare(&mut ctx, &mut arena, td, f).unwrap();

    let ds = arena
        .chain(vec![TypeExp::new(Op::Const), TypeExp::named(Op::TypedefName, "F")])
        .unwrap();
    let x = dtor(&mut arena, "f", vec![]);
    analyze_decl_specs(&mut arena, ds).unwrap();
    let x = ctx.analyze_declarator(&mut arena, ds, Some(x), true).unwrap().unwrap();

    // the qualifier was dropped entirely: not on the specifiers, not on
    // the spliced function type
    assert!(arena.type_qual(ds).is_none());
    let fnode = arena[x].child.unwrap();
    assert_eq!(arena[fnode].op, Op::Function);
    assert_eq!(arena[fnode].qual(), None);
}

// extern int x; int x;  =>  tentative
#[test]
fn extern_then_bare_object_becomes_tentative() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Extern, Op::Int]);
    let x1 = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds1, x1).unwrap();
    assert_eq!(ctx.extern_ids().status("x"), Some(ExtIdStatus::Referenced));

    let ds2 = specs(&mut arena, &[Op::Int]);
    let x2 = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds2, x2).unwrap();
    assert_eq!(ctx.extern_ids().status("x"), Some(ExtIdStatus::Tentative));
}

// static int x; int x;
#[test]
fn non_static_after_static_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Static, Op::Int]);
    let x1 = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds1, x1).unwrap();

    let ds2 = specs(&mut arena, &[Op::Int]);
    let x2 = dtor(&mut arena, "x", vec![]);
    let err = declare(&mut ctx, &mut arena, ds2, x2).unwrap_err();
    assert!(matches!(err, SemaError::NonStaticAfterStatic { .. }));
}

// int x = 0; int x = 1;
#[test]
fn second_definition_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let init1 = arena.alloc_expr(Expr { value: 0 });
    let ds1 = specs(&mut arena, &[Op::Int]);
    let x1 = arena
        .chain(vec![TypeExp::named(Op::Id, "x").with_attr(Attr::Expr(init1))])
        .unwrap();
    declare(&mut ctx, &mut arena, ds1, x1).unwrap();
    assert_eq!(ctx.extern_ids().status("x"), Some(ExtIdStatus::Defined));

    let init2 = arena.alloc_expr(Expr { value: 1 });
    let ds2 = specs(&mut arena, &[Op::Int]);
    let x2 = arena
        .chain(vec![TypeExp::named(Op::Id, "x").with_attr(Attr::Expr(init2))])
        .unwrap();
    let err = declare(&mut ctx, &mut arena, ds2, x2).unwrap_err();
    assert!(err.to_string().contains("redefinition of 'x'"));
}

// int x; long x;
#[test]
fn conflicting_types_render_both_sides() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds1 = specs(&mut arena, &[Op::Int]);
    let x1 = dtor(&mut arena, "x", vec![]);
    declare(&mut ctx, &mut arena, ds1, x1).unwrap();

    let ds2 = specs(&mut arena, &[Op::Long]);
    let x2 = dtor(&mut arena, "x", vec![]);
    arena[x2].loc = Loc::new("t.c", 3, 5);
    let err = declare(&mut ctx, &mut arena, ds2, x2).unwrap_err();
    let rendered = err.to_string();
    let mut lines = rendered.lines();
    assert_eq!(
        lines.next(),
        Some("t.c:3:5: error: conflicting types for 'x'")
    );
    assert_eq!(
        lines.next(),
        Some("=> previously declared with type 'int'")
    );
    assert_eq!(lines.next(), Some("=> now declared with type 'long'"));
}

// { extern int y = 1; }
#[test]
fn block_scope_extern_with_initializer_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();
    ctx.push_scope().unwrap();

    let init = arena.alloc_expr(Expr { value: 1 });
    let ds = specs(&mut arena, &[Op::Extern, Op::Int]);
    let y = arena
        .chain(vec![TypeExp::named(Op::Id, "y").with_attr(Attr::Expr(init))])
        .unwrap();
    let err = declare(&mut ctx, &mut arena, ds, y).unwrap_err();
    assert!(matches!(err, SemaError::InitializedExtern { .. }));
}

// { static int f(void); }
#[test]
fn block_scope_static_function_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();
    ctx.push_scope().unwrap();

    let void_ds = specs(&mut arena, &[Op::Void]);
    let params = vec![Declaration::new(void_ds, None)];
    let ds = specs(&mut arena, &[Op::Static, Op::Int]);
    let f = dtor(&mut arena, "f", vec![func(params)]);
    let err = declare(&mut ctx, &mut arena, ds, f).unwrap_err();
    assert!(matches!(err, SemaError::BlockScopeFunctionStorage { .. }));
}

// int a[10](void);  array of functions
#[test]
fn array_of_functions_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let size = arena.alloc_expr(Expr { value: 10 });
    let void_ds = specs(&mut arena, &[Op::Void]);
    let params = vec![Declaration::new(void_ds, None)];
    let ds = specs(&mut arena, &[Op::Int]);
    let a = dtor(&mut arena, "a", vec![array(Some(size)), func(params)]);
    let err = ctx.analyze_declarator(&mut arena, ds, Some(a), true).unwrap_err();
    assert!(matches!(err, SemaError::ArrayOfFunctions { .. }));
}

#[test]
fn function_returning_function_or_array_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds = specs(&mut arena, &[Op::Int]);
    let f = dtor(&mut arena, "f", vec![func(vec![]), func(vec![])]);
    assert!(matches!(
        ctx.analyze_declarator(&mut arena, ds, Some(f), false),
        Err(SemaError::FunctionReturningFunction { .. })
    ));

    let ds2 = specs(&mut arena, &[Op::Int]);
    let g = dtor(&mut arena, "g", vec![func(vec![]), array(None)]);
    assert!(matches!(
        ctx.analyze_declarator(&mut arena, ds2, Some(g), false),
        Err(SemaError::FunctionReturningArray { .. })
    ));
}

// void f(void) { }  then  void f(void) { }
#[test]
fn function_redefinition_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let define = |arena: &mut Arena, ctx: &mut AnalysisContext| {
        let void_ds = specs(arena, &[Op::Void]);
        let params = vec![Declaration::new(void_ds, None)];
        let ds = specs(arena, &[Op::Void]);
        let header = dtor(arena, "f", vec![func(params)]);
        ctx.push_scope().unwrap(); // parameter scope
        let r = ctx.analyze_function_definition(arena, &FuncDef { decl_specs: ds, header });
        ctx.pop_scope();
        r
    };
    define(&mut arena, &mut ctx).unwrap();
    assert_eq!(ctx.extern_ids().status("f"), Some(ExtIdStatus::Defined));

    let err = define(&mut arena, &mut ctx).unwrap_err();
    assert!(err.to_string().contains("redefinition of 'f'"));
}

#[test]
fn function_definition_requires_named_parameters() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let int_ds = specs(&mut arena, &[Op::Int]);
    let params = vec![Declaration::new(int_ds, None)];
    let ds = specs(&mut arena, &[Op::Void]);
    let header = dtor(&mut arena, "f", vec![func(params)]);
    ctx.push_scope().unwrap();
    let err = ctx
        .analyze_function_definition(&mut arena, &FuncDef { decl_specs: ds, header })
        .unwrap_err();
    assert!(matches!(err, SemaError::MissingParameterName { .. }));
}

#[test]
fn function_definition_header_must_be_a_function() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds = specs(&mut arena, &[Op::Int]);
    let header = dtor(&mut arena, "x", vec![]);
    let err = ctx
        .analyze_function_definition(&mut arena, &FuncDef { decl_specs: ds, header })
        .unwrap_err();
    assert!(matches!(err, SemaError::NotAFunctionDeclarator { .. }));
}

#[test]
fn function_definition_storage_class_is_checked() {
    // typedef void f(void) { }  only extern and static are allowed
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let void_ds = specs(&mut arena, &[Op::Void]);
    let params = vec![Declaration::new(void_ds, None)];
    let ds = specs(&mut arena, &[Op::Typedef, Op::Void]);
    let header = dtor(&mut arena, "f", vec![func(params)]);
    ctx.push_scope().unwrap();
    let err = ctx
        .analyze_function_definition(&mut arena, &FuncDef { decl_specs: ds, header })
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("invalid storage class 'typedef' in function definition"));
}

#[test]
fn file_scope_register_object_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds = specs(&mut arena, &[Op::Register, Op::Int]);
    let x = dtor(&mut arena, "x", vec![]);
    let err = declare(&mut ctx, &mut arena, ds, x).unwrap_err();
    assert!(err
        .to_string()
        .contains("file-scope declaration of 'x' specifies 'register'"));
}

// struct S { void m(void); };
#[test]
fn function_member_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let void_ds = specs(&mut arena, &[Op::Void]);
    let params = vec![Declaration::new(void_ds, None)];
    let sql = specs(&mut arena, &[Op::Int]);
    let m = dtor(&mut arena, "m", vec![func(params)]);
    let err = ctx.analyze_struct_declarator(&mut arena, sql, m).unwrap_err();
    assert!(err.to_string().contains("member 'm' declared as a function"));
}

// struct S { int a[]; };
#[test]
fn unsized_array_member_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let sql = specs(&mut arena, &[Op::Int]);
    let m = dtor(&mut arena, "a", vec![array(None)]);
    let err = ctx.analyze_struct_declarator(&mut arena, sql, m).unwrap_err();
    assert!(err.to_string().contains("member 'a' has incomplete type"));
}

// struct S; struct S x;  incomplete member type
#[test]
fn member_of_incomplete_tag_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    // forward-declared tag, no member list
    let tag = arena.alloc(TypeExp::named(Op::Struct, "S"));
    ctx.install_tag(&arena, tag);

    let sql = arena.chain(vec![TypeExp::named(Op::Struct, "S")]).unwrap();
    let m = dtor(&mut arena, "s", vec![]);
    let err = ctx.analyze_struct_declarator(&mut arena, sql, m).unwrap_err();
    assert!(err.to_string().contains("member 's' has incomplete type"));

    // completing the tag makes the same member legal
    let member_ds = specs(&mut arena, &[Op::Int]);
    let member = dtor(&mut arena, "n", vec![]);
    let complete = arena.alloc(
        TypeExp::named(Op::Struct, "S")
            .with_attr(Attr::Decls(vec![Declaration::new(member_ds, Some(member))])),
    );
    ctx.install_tag(&arena, complete);
    let m2 = dtor(&mut arena, "s2", vec![]);
    assert!(ctx.analyze_struct_declarator(&mut arena, sql, m2).is_ok());
}

// void f(int); visible as prototype, then a compatible call-site decl
#[test]
fn compatible_function_redeclarations_are_accepted() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let int_ds = specs(&mut arena, &[Op::Int]);
    let p1 = vec![Declaration::new(int_ds, None)];
    let ds1 = specs(&mut arena, &[Op::Void]);
    let f1 = dtor(&mut arena, "f", vec![func(p1)]);
    declare(&mut ctx, &mut arena, ds1, f1).unwrap();
    assert_eq!(ctx.extern_ids().status("f"), Some(ExtIdStatus::Referenced));

    let int_ds2 = specs(&mut arena, &[Op::Int]);
    let p2 = vec![Declaration::new(int_ds2, None)];
    let ds2 = specs(&mut arena, &[Op::Void]);
    let f2 = dtor(&mut arena, "f", vec![func(p2)]);
    declare(&mut ctx, &mut arena, ds2, f2).unwrap();
    assert_eq!(ctx.extern_ids().status("f"), Some(ExtIdStatus::Referenced));
}

#[test]
fn incompatible_function_redeclaration_is_rejected() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let int_ds = specs(&mut arena, &[Op::Int]);
    let p1 = vec![Declaration::new(int_ds, None)];
    let ds1 = specs(&mut arena, &[Op::Void]);
    let f1 = dtor(&mut arena, "f", vec![func(p1)]);
    declare(&mut ctx, &mut arena, ds1, f1).unwrap();

    let long_ds = specs(&mut arena, &[Op::Long]);
    let p2 = vec![Declaration::new(long_ds, None)];
    let ds2 = specs(&mut arena, &[Op::Void]);
    let f2 = dtor(&mut arena, "f", vec![func(p2)]);
    let err = declare(&mut ctx, &mut arena, ds2, f2).unwrap_err();
    assert!(matches!(err, SemaError::ConflictingTypes { .. }));
}

// typedef int A; { A x; is_typedef_name still answers across scopes }
#[test]
fn typedef_visibility_tracks_scopes() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let td = specs(&mut arena, &[Op::Typedef, Op::Int]);
    let a = dtor(&mut arena, "A", vec![]);
    declare(&mut ctx, &mut arena, td, a).unwrap();
    assert!(ctx.is_typedef_name(&arena, "A"));

    ctx.push_scope().unwrap();
    assert!(ctx.is_typedef_name(&arena, "A"));
    // an ordinary inner declaration shadows the typedef
    let ds = specs(&mut arena, &[Op::Int]);
    let shadow = dtor(&mut arena, "A", vec![]);
    ctx.analyze_declarator(&mut arena, ds, Some(shadow), true).unwrap();
    assert!(!ctx.is_typedef_name(&arena, "A"));
    ctx.pop_scope();
    assert!(ctx.is_typedef_name(&arena, "A"));
}

// print + rebuild = compatible (the round-trip property, without a
// parser to re-parse with)
#[test]
fn printed_types_rebuild_compatibly() {
    let mut arena = Arena::new();

    let ds = specs(&mut arena, &[Op::Unsigned, Op::Short, Op::Int]);
    analyze_decl_specs(&mut arena, ds).unwrap();
    let idl = dtor(&mut arena, "p", vec![TypeExp::new(Op::Star), array(None)]);
    let printed = stringify_type_exp(&arena, &Declaration::new(ds, Some(idl)));
    assert_eq!(printed, "unsigned short (*)[]");

    // rebuild what the rendering describes
    let ds2 = specs(&mut arena, &[Op::UnsignedShort]);
    let idl2 = dtor(&mut arena, "q", vec![TypeExp::new(Op::Star), array(None)]);
    assert!(crate::sema::compat::compare_and_compose(
        &mut arena,
        ds,
        Some(idl),
        ds2,
        Some(idl2),
        true
    ));
}

#[test]
fn scope_teardown_leaves_only_file_scope_entries() {
    let mut arena = Arena::new();
    let mut ctx = AnalysisContext::new();

    let ds = specs(&mut arena, &[Op::Int]);
    let x = dtor(&mut arena, "global", vec![]);
    declare(&mut ctx, &mut arena, ds, x).unwrap();

    ctx.push_scope().unwrap();
    let ds2 = specs(&mut arena, &[Op::Int]);
    let y = dtor(&mut arena, "local", vec![]);
    ctx.analyze_declarator(&mut arena, ds2, Some(y), true).unwrap();
    ctx.pop_scope();

    assert!(ctx.lookup("local", true).is_none());
    assert!(ctx.lookup("global", true).is_some());
}
