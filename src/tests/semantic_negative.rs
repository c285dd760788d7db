use crate::ast::{Expr, Stmt};
use crate::semantic::SemanticError;
use crate::tests::test_utils::{errors, function_type, ident, int, name, setup_checker, var};
use crate::types::{Specifier, Type};

fn messages(checker: &crate::semantic::Checker) -> Vec<String> {
    errors(checker).iter().map(ToString::to_string).collect()
}

#[test]
fn pointer_plus_pointer() {
    let mut checker = setup_checker();
    let p = var(&mut checker, "p", Type::scalar(Specifier::Int, 1));
    let q = var(&mut checker, "q", Type::scalar(Specifier::Int, 1));

    let sum = checker.check_add(p, q);
    assert!(sum.is_error());
    assert_eq!(messages(&checker), ["invalid operands to binary +"]);
}

#[test]
fn mismatched_pointer_difference() {
    let mut checker = setup_checker();
    let p = var(&mut checker, "p", Type::scalar(Specifier::Int, 1));
    let q = var(&mut checker, "q", Type::scalar(Specifier::Char, 1));

    assert!(checker.check_subtract(p, q).is_error());
    assert_eq!(messages(&checker), ["invalid operands to binary -"]);
}

#[test]
fn address_of_constant() {
    let mut checker = setup_checker();
    let address = checker.check_address(int(5));

    assert!(address.is_error());
    assert_eq!(errors(&checker), vec![SemanticError::LvalueRequired]);
}

#[test]
fn address_of_array_is_not_an_lvalue() {
    let mut checker = setup_checker();
    let a = var(&mut checker, "a", Type::array(Specifier::Char, 0, 8));

    checker.check_address(a);
    assert_eq!(messages(&checker), ["lvalue required in expression"]);
}

#[test]
fn sizeof_function() {
    let mut checker = setup_checker();
    let f = checker.declare_function(name("f"), Type::function(Specifier::Int, 0, None));
    let callee = checker.identifier(f);

    let size = checker.check_sizeof(callee);
    assert_eq!(size.ty, Type::int());
    assert_eq!(errors(&checker), vec![SemanticError::InvalidSizeof]);
}

#[test]
fn error_operands_do_not_cascade() {
    let mut checker = setup_checker();
    checker.open_scope();

    let y = ident(&mut checker, "y");
    let sum = checker.check_add(y.clone(), int(1));
    let product = checker.check_multiply(sum, int(2));
    let negated = checker.check_negate(product);
    let compared = checker.check_less_than(negated, int(0));
    let not = checker.check_not(compared);
    let deref = checker.check_dereference(y.clone());
    let address = checker.check_address(y.clone());
    let cast = checker.check_cast(Type::long(), y.clone());
    let index = checker.check_index(y.clone(), int(0));
    checker.check_assignment(y.clone(), int(1));
    checker.check_if(y, Stmt::Expr(int(0)), None);

    for expr in [not, deref, address, cast, index] {
        assert!(expr.is_error());
    }
    assert_eq!(errors(&checker), vec![SemanticError::Undeclared(name("y"))]);
}

#[test]
fn invalid_unary_operands() {
    let mut checker = setup_checker();
    let x = var(&mut checker, "x", Type::int());
    let p = var(&mut checker, "p", Type::scalar(Specifier::Long, 1));
    let f = checker.declare_function(name("f"), Type::function(Specifier::Int, 0, None));
    let f = checker.identifier(f);

    assert!(checker.check_dereference(x).is_error());
    assert!(checker.check_negate(p).is_error());
    assert!(checker.check_not(f).is_error());

    assert_eq!(
        messages(&checker),
        [
            "invalid operand to unary *",
            "invalid operand to unary -",
            "invalid operand to unary !"
        ]
    );
}

#[test]
fn invalid_binary_operands() {
    let mut checker = setup_checker();
    let x = var(&mut checker, "x", Type::int());
    let p = var(&mut checker, "p", Type::scalar(Specifier::Int, 1));
    let f = checker.declare_function(name("f"), Type::function(Specifier::Int, 0, None));
    let f = checker.identifier(f);

    assert!(checker.check_multiply(p.clone(), int(2)).is_error());
    assert!(checker.check_remainder(int(2), p.clone()).is_error());
    assert!(checker.check_less_than(x.clone(), p.clone()).is_error());
    assert!(checker.check_logical_and(f, x.clone()).is_error());
    assert!(checker.check_index(x, int(1)).is_error());

    assert_eq!(
        messages(&checker),
        [
            "invalid operands to binary *",
            "invalid operands to binary %",
            "invalid operands to binary <",
            "invalid operands to binary &&",
            "invalid operands to binary []"
        ]
    );
}

#[test]
fn invalid_casts() {
    let mut checker = setup_checker();
    let p = var(&mut checker, "p", Type::scalar(Specifier::Int, 1));

    assert!(checker.check_cast(Type::int(), p).is_error());
    assert!(checker.check_cast(Type::scalar(Specifier::Char, 1), int(0)).is_error());
    assert_eq!(errors(&checker), vec![SemanticError::InvalidCast, SemanticError::InvalidCast]);
}

#[test]
fn invalid_assignments() {
    let mut checker = setup_checker();
    let x = var(&mut checker, "x", Type::int());
    let p = var(&mut checker, "p", Type::scalar(Specifier::Int, 1));
    let a = var(&mut checker, "a", Type::array(Specifier::Int, 0, 2));

    checker.check_assignment(int(1), x.clone());
    checker.check_assignment(a, int(0));
    checker.check_assignment(x, p);

    assert_eq!(
        messages(&checker),
        [
            "lvalue required in expression",
            "lvalue required in expression",
            "invalid operands to binary ="
        ]
    );
}

#[test]
fn invalid_return_type() {
    let mut checker = setup_checker();
    checker.define_function(name("f"), function_type(Type::scalar(Specifier::Char, 1), &[]));
    checker.open_scope();

    checker.check_return(int(1));
    assert_eq!(errors(&checker), vec![SemanticError::InvalidReturnType]);
}

#[test]
fn invalid_test_expression() {
    let mut checker = setup_checker();
    let f = checker.declare_function(name("f"), Type::function(Specifier::Int, 0, None));
    let f = checker.identifier(f);

    checker.check_while(f, Stmt::Expr(int(0)));
    assert_eq!(errors(&checker), vec![SemanticError::InvalidTestExpression]);
}

#[test]
fn diagnostics_carry_the_current_line() {
    let mut checker = setup_checker();
    checker.set_line(3);
    ident(&mut checker, "y");
    checker.set_line(7);
    checker.check_address(Expr::number(1, Type::long()));
    checker.set_line(9);
    checker.declare_variable(name("z"), Type::int());
    checker.declare_variable(name("z"), Type::char());
    checker.define_function(name("g"), function_type(Type::int(), &[]));
    checker.define_function(name("g"), function_type(Type::int(), &[]));

    assert_eq!(
        checker.diagnostics().render(),
        "line 3: error: 'y' undeclared\n\
         line 7: error: lvalue required in expression\n\
         line 9: error: conflicting types for 'z'\n\
         line 9: error: redefinition of 'g'\n"
    );
    assert!(checker.diagnostics().has_errors());
}
