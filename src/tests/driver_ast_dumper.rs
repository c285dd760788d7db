use thin_vec::thin_vec;

use crate::Compiler;
use crate::ast::AstDumper;
use crate::codegen::allocate;
use crate::tests::test_utils::{add_function, begin_function, ident, int, linux, name, setup_checker, var};
use crate::types::{Specifier, Type};

#[test]
fn dump_function_before_allocation() {
    let mut compiler = Compiler::new(linux());
    add_function(&mut compiler);

    insta::assert_snapshot!(compiler.dump().trim_end(), @r"
    Function f int(int, int)
      Block
        Declare a int
        Declare b int
        Return
          Add int
            Identifier a int
            Identifier b int
    ");
}

#[test]
fn dump_index_rewrite() {
    let mut checker = setup_checker();
    let a = var(&mut checker, "a", Type::array(Specifier::Int, 0, 10));
    let i = var(&mut checker, "i", Type::int());
    let element = checker.check_index(a, i);

    insta::assert_snapshot!(AstDumper::dump_expr(checker.symbols(), &element).trim_end(), @r"
    Dereference int
      Add int *
        Address int *
          Identifier a int[10]
        Multiply long
          Cast long
            Identifier i int
          Number 4 long
    ");
}

#[test]
fn dump_statements_with_offsets() {
    // long g(char c) { long l; while (c) l = c; if (l) return l; else return 0; }
    let mut checker = setup_checker();
    let (g, scope) = begin_function(&mut checker, "g", Type::long(), &[("c", Type::char())]);
    checker.declare_variable(name("l"), Type::long());

    let c = ident(&mut checker, "c");
    let (l, value) = (ident(&mut checker, "l"), ident(&mut checker, "c"));
    let body = checker.check_assignment(l, value);
    let lp = checker.check_while(c, body);

    let l = ident(&mut checker, "l");
    let value = ident(&mut checker, "l");
    let then_stmt = checker.check_return(value);
    let else_stmt = checker.check_return(int(0));
    let branch = checker.check_if(l, then_stmt, Some(else_stmt));

    checker.close_scope();
    let body = checker.block(scope, thin_vec![lp, branch]);
    let function = checker.function(g, body);

    let (mut symbols, _) = checker.into_parts();
    allocate(&mut symbols, &function);

    insta::assert_snapshot!(AstDumper::dump_function(&symbols, &function).trim_end(), @r"
    Function g long(char)
      Block
        Declare c char @-1
        Declare l long @-9
        While
          Cast int
            Identifier c char
          Assign
            Identifier l long
            Cast long
              Identifier c char
        If
          Identifier l long
          Return
            Identifier l long
        Else
          Return
            Cast long
              Number 0 int
    ");
}

#[test]
fn dump_string_and_call() {
    let mut checker = setup_checker();
    let puts = checker.declare_function(name("puts"), Type::function(Specifier::Int, 0, None));
    let text = checker.string("\"a\\n\"");
    let call = checker.check_call(puts, thin_vec![text]);

    assert_eq!(
        AstDumper::dump_expr(checker.symbols(), &call),
        "Call puts int\n  Address char *\n    String \"a\\n\" char[3]\n"
    );
}
