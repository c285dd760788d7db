use thin_vec::thin_vec;

use crate::Compiler;
use crate::tests::test_utils::{begin_function, end_function, ident, int, linux, name, run_pass};
use crate::types::{Specifier, Type};

fn int_ptr() -> Type {
    Type::scalar(Specifier::Int, 1)
}

#[test]
fn indexed_load() {
    // int get(int *p, long i) { return p[i]; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "get", Type::int(), &[("p", int_ptr()), ("i", Type::long())]);
    let (p, i) = (ident(c, "p"), ident(c, "i"));
    let element = c.check_index(p, i);
    let ret = c.check_return(element);
    end_function(&mut compiler, f, scope, thin_vec![ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains("    movq %rdi, -8(%rbp)\n    movq %rsi, -16(%rbp)\n"));
    assert!(assembly.contains(
        "    movq -16(%rbp), %rax\n\
         \x20   imulq $4, %rax\n\
         \x20   movq -8(%rbp), %rdi\n\
         \x20   addq %rax, %rdi\n\
         \x20   movl (%rdi), %edi\n\
         \x20   movl %edi, %eax\n\
         \x20   jmp .L0\n"
    ));
}

#[test]
fn store_through_pointer() {
    // int set(int *p) { *p = 5; return 0; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "set", Type::int(), &[("p", int_ptr())]);
    let p = ident(c, "p");
    let target = c.check_dereference(p);
    let store = c.check_assignment(target, int(5));
    let ret = c.check_return(int(0));
    end_function(&mut compiler, f, scope, thin_vec![store, ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains("    movl $5, %eax\n    movq -8(%rbp), %rdi\n    movl %eax, (%rdi)\n"));
}

#[test]
fn pointer_difference_divides() {
    // long dist(int *p, int *q) { return p - q; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "dist", Type::long(), &[("p", int_ptr()), ("q", int_ptr())]);
    let (p, q) = (ident(c, "p"), ident(c, "q"));
    let distance = c.check_subtract(p, q);
    let ret = c.check_return(distance);
    end_function(&mut compiler, f, scope, thin_vec![ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains(
        "    movq -8(%rbp), %rax\n\
         \x20   subq -16(%rbp), %rax\n\
         \x20   movq $4, %rcx\n\
         \x20   cqto\n\
         \x20   idivq %rcx\n\
         \x20   jmp .L0\n"
    ));
}

#[test]
fn address_of_local() {
    // int *addr() { int x; return &x; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "addr", int_ptr(), &[]);
    c.declare_variable(name("x"), Type::int());
    let x = ident(c, "x");
    let address = c.check_address(x);
    let ret = c.check_return(address);
    end_function(&mut compiler, f, scope, thin_vec![ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains("    leaq -4(%rbp), %rax\n    jmp .L0\n"));
}

#[test]
fn address_of_dereference_is_the_pointer() {
    // int *same(int *p) { return &*p; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "same", int_ptr(), &[("p", int_ptr())]);
    let p = ident(c, "p");
    let deref = c.check_dereference(p);
    let address = c.check_address(deref);
    let ret = c.check_return(address);
    end_function(&mut compiler, f, scope, thin_vec![ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains("    movq -8(%rbp), %rax\n    jmp .L0\n"));
    assert!(!assembly.contains("leaq"));
}

#[test]
fn char_load_through_pointer() {
    // char first(char *s) { return *s; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "first", Type::char(), &[("s", Type::scalar(Specifier::Char, 1))]);
    let s = ident(c, "s");
    let value = c.check_dereference(s);
    let ret = c.check_return(value);
    end_function(&mut compiler, f, scope, thin_vec![ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains("    movq -8(%rbp), %rax\n    movb (%rax), %al\n    jmp .L0\n"));
}

#[test]
fn local_array_element_store() {
    // int fill() { int a[4]; a[2] = 9; return 0; }
    let mut compiler = Compiler::new(linux());
    let c = compiler.checker();
    let (f, scope) = begin_function(c, "fill", Type::int(), &[]);
    c.declare_variable(name("a"), Type::array(Specifier::Int, 0, 4));
    let a = ident(c, "a");
    let element = c.check_index(a, int(2));
    let store = c.check_assignment(element, int(9));
    let ret = c.check_return(int(0));
    end_function(&mut compiler, f, scope, thin_vec![store, ret]);

    let assembly = run_pass(compiler);
    assert!(assembly.contains(
        "    leaq -16(%rbp), %rax\n\
         \x20   movl $2, %edi\n\
         \x20   movslq %edi, %rdi\n\
         \x20   imulq $4, %rdi\n\
         \x20   addq %rdi, %rax\n\
         \x20   movl $9, %edi\n\
         \x20   movl %edi, (%rax)\n"
    ));
}
