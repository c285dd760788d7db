//! Arithmetic lowering, the register pool and spilling.

use thin_vec::thin_vec;

use crate::Compiler;
use crate::ast::Expr;
use crate::semantic::Checker;
use crate::tests::test_utils::{add_function, begin_function, end_function, ident, linux, run_pass};
use crate::types::Type;

/// `int name(params) { return <body>; }` with `body` built by the closure.
fn compile_return(
    compiler: &mut Compiler,
    text: &str,
    result: Type,
    params: &[(&str, Type)],
    body: impl FnOnce(&mut Checker) -> Expr,
) {
    let c = compiler.checker();
    let (f, scope) = begin_function(c, text, result, params);
    let value = body(c);
    let ret = c.check_return(value);
    end_function(compiler, f, scope, thin_vec![ret]);
}

#[test]
fn add_two_parameters() {
    let mut compiler = Compiler::new(linux());
    add_function(&mut compiler);
    let assembly = run_pass(compiler);

    insta::assert_snapshot!(assembly.trim_end(), @r"
        .globl f
    f:
        pushq %rbp
        movq %rsp, %rbp
        subq $16, %rsp
        movl %edi, -4(%rbp)
        movl %esi, -8(%rbp)
        movl -4(%rbp), %eax
        addl -8(%rbp), %eax
        jmp .L0
    .L0:
        movq %rbp, %rsp
        popq %rbp
        ret
    ");
}

#[test]
fn divide_uses_rax_rdx_pair() {
    let mut compiler = Compiler::new(linux());
    compile_return(&mut compiler, "q", Type::int(), &[("a", Type::int()), ("b", Type::int())], |c| {
        let (a, b) = (ident(c, "a"), ident(c, "b"));
        c.check_divide(a, b)
    });
    let assembly = run_pass(compiler);

    assert!(assembly.contains(
        "    movl -4(%rbp), %eax\n\
         \x20   movl -8(%rbp), %ecx\n\
         \x20   cltd\n\
         \x20   idivl %ecx\n\
         \x20   jmp .L0\n"
    ));
}

#[test]
fn remainder_comes_from_rdx() {
    let mut compiler = Compiler::new(linux());
    compile_return(&mut compiler, "r", Type::long(), &[("a", Type::long()), ("b", Type::long())], |c| {
        let (a, b) = (ident(c, "a"), ident(c, "b"));
        c.check_remainder(a, b)
    });
    let assembly = run_pass(compiler);

    assert!(assembly.contains(
        "    movq -8(%rbp), %rax\n\
         \x20   movq -16(%rbp), %rcx\n\
         \x20   cqto\n\
         \x20   idivq %rcx\n\
         \x20   movq %rdx, %rax\n"
    ));
}

#[test]
fn wide_constant_is_moved_into_a_register() {
    let mut compiler = Compiler::new(linux());
    let big = compiler.number("4294967296").unwrap();
    assert_eq!(big.ty, Type::long());

    compile_return(&mut compiler, "big", Type::long(), &[], |_| big);
    let assembly = run_pass(compiler);

    assert!(assembly.contains("    movq $4294967296, %rax\n    jmp .L0\n"));
    // Nothing is stored, so there is no frame to reserve.
    assert!(!assembly.contains("subq"));
}

#[test]
fn widening_and_narrowing_casts() {
    let mut compiler = Compiler::new(linux());
    compile_return(&mut compiler, "widen", Type::long(), &[("c", Type::char())], |c| ident(c, "c"));
    compile_return(&mut compiler, "narrow", Type::char(), &[("l", Type::long())], |c| ident(c, "l"));
    let assembly = run_pass(compiler);

    assert!(assembly.contains("    movb %dil, -1(%rbp)\n"));
    assert!(assembly.contains("    movb -1(%rbp), %al\n    movsbq %al, %rax\n"));
    assert!(assembly.contains("    movq -8(%rbp), %rax\n    movb %al, %al\n"));
}

#[test]
fn negate() {
    let mut compiler = Compiler::new(linux());
    compile_return(&mut compiler, "neg", Type::int(), &[("a", Type::int())], |c| {
        let a = ident(c, "a");
        c.check_negate(a)
    });
    let assembly = run_pass(compiler);

    assert!(assembly.contains("    movl -4(%rbp), %eax\n    negl %eax\n    jmp .L0\n"));
}

/// `(x*x) + ((x*x) + ... (x*x))` keeps more values live than there are
/// registers.
fn squares(c: &mut Checker, count: usize) -> Expr {
    let square = |c: &mut Checker| {
        let (x, y) = (ident(c, "x"), ident(c, "x"));
        c.check_multiply(x, y)
    };

    let mut sum = square(c);
    for _ in 1..count {
        let left = square(c);
        sum = c.check_add(left, sum);
    }
    sum
}

#[test]
fn registers_spill_to_temporaries() {
    let mut compiler = Compiler::new(linux().annotated());
    compile_return(&mut compiler, "s", Type::int(), &[("x", Type::int())], |c| squares(c, 9));
    let assembly = run_pass(compiler);

    assert!(assembly.contains("    movl %eax, -8(%rbp)\n    # spill\n"));
    assert!(assembly.contains("    movl %eax, -12(%rbp)\n    # spill\n"));
    assert!(assembly.contains("    movl -8(%rbp), %eax\n    addl %edi, %eax\n    jmp .L0\n"));
    // Spill slots are part of the frame.
    assert!(assembly.contains("    subq $16, %rsp\n"));
    assert!(assembly.contains("    # imul\n"));
}

#[test]
fn few_live_values_never_spill() {
    let mut compiler = Compiler::new(linux().annotated());
    compile_return(&mut compiler, "s", Type::int(), &[("x", Type::int())], |c| squares(c, 7));
    let assembly = run_pass(compiler);

    assert!(!assembly.contains("# spill"));
    assert!(assembly.contains("    addl %edi, %eax\n"));
}

#[test]
fn annotations_are_off_by_default() {
    let mut compiler = Compiler::new(linux());
    compile_return(&mut compiler, "s", Type::int(), &[("x", Type::int())], |c| squares(c, 9));
    let assembly = run_pass(compiler);

    assert!(!assembly.contains('#'));
}
