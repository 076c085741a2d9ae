use super::{interpreter, output, run, runtime_error, static_errors};
use crate::{
    config::Config,
    driver::{self, LoxError, EXIT_FATAL, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR},
    runtime::error::RuntimeError,
};
use pretty_assertions::assert_eq;

#[test]
fn closures_capture_variables_not_values() {
    let source = "var f; { var x = 1; fun g() { return x; } f = g; x = 2; } print f();";
    assert_eq!(output(source), "2\n");
}

#[test]
fn counters_keep_their_own_state() {
    let source = r#"
        fun makeCounter() {
            var i = 0;
            fun count() { i = i + 1; return i; }
            return count;
        }
        var a = makeCounter();
        var b = makeCounter();
        a();
        print a();
        print b();
    "#;
    assert_eq!(output(source), "2\n1\n");
}

#[test]
fn nearest_declaration_wins() {
    let source = r#"
        var a = "global";
        {
            var a = "outer";
            { var a = "inner"; print a; }
            print a;
        }
        print a;
    "#;
    assert_eq!(output(source), "inner\nouter\nglobal\n");
}

#[test]
fn functions_see_the_scope_at_their_declaration() {
    let source = r#"
        var a = "global";
        {
            fun show() { print a; }
            show();
            var a = "block";
            show();
        }
    "#;
    assert_eq!(output(source), "global\nglobal\n");
}

#[test]
fn self_referencing_initializer_is_rejected_before_running() {
    let errors = static_errors("print \"ran\"; var a = a;");
    assert_eq!(
        errors,
        vec!["[line 1] Error at 'a': Can't read global variable in its own initializer."]
    );
    let (out, _) = run("print \"ran\"; var a = a;");
    assert_eq!(out, "");
}

#[test]
fn plus_concatenates_when_text_or_numbers_mix() {
    let source = r#"
        print "x" + 1;
        print 1 + "x";
        print 1.5 + "a";
        print "a" + "b";
        print 1 + 2;
    "#;
    assert_eq!(output(source), "x1\n1x\n1.5a\nab\n3\n");
}

#[test]
fn plus_without_text_or_numbers_fails() {
    let (_, err) = runtime_error("print nil + nil;");
    assert!(matches!(err, RuntimeError::InvalidOperands { .. }));
}

#[test]
fn division_by_zero_is_an_error() {
    let (out, err) = runtime_error("print 6 / 3;\nprint 1 / 0.0;");
    assert_eq!(out, "2\n");
    assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    assert_eq!(err.line(), 2);
}

#[test]
fn arithmetic_and_comparison_need_numbers() {
    let (_, err) = runtime_error("print -\"a\";");
    assert!(matches!(err, RuntimeError::OperandNotNumber { .. }));
    let (_, err) = runtime_error("print 1 < \"2\";");
    assert!(matches!(err, RuntimeError::OperandsNotNumbers { .. }));
    let (_, err) = runtime_error("print true * 2;");
    assert!(matches!(err, RuntimeError::OperandsNotNumbers { .. }));
}

#[test]
fn values_print_in_their_canonical_form() {
    let source = r#"
        fun f() {}
        class C {}
        print f;
        print clock;
        print C;
        print C();
        print nil;
        print true;
        print 3;
        print 2.5;
        print -0.5;
    "#;
    assert_eq!(
        output(source),
        "<fn f>\n<native fn>\nC\nC instance\nnil\ntrue\n3\n2.5\n-0.5\n"
    );
}

#[test]
fn equality_compares_by_kind_and_value() {
    let source = r#"
        fun f() {}
        print nil == nil;
        print nil == false;
        print 1 == 1;
        print 1 == "1";
        print "a" == "a";
        print f == f;
        print clock != clock;
    "#;
    assert_eq!(output(source), "true\nfalse\ntrue\nfalse\ntrue\ntrue\nfalse\n");
}

#[test]
fn logic_returns_the_deciding_operand() {
    let source = r#"
        print nil or "yes";
        print false and 1;
        print 1 and 2;
        print "first" or boom;
    "#;
    assert_eq!(output(source), "yes\nfalse\n2\nfirst\n");
}

#[test]
fn truthiness_treats_zero_and_empty_text_as_true() {
    let source = r#"
        if (0) print "zero"; else print "no";
        if ("") print "empty"; else print "no";
        if (nil) print "nil"; else print "no";
        print !nil;
    "#;
    assert_eq!(output(source), "zero\nempty\nno\ntrue\n");
}

#[test]
fn prefix_increment_updates_the_binding() {
    let source = r#"
        var i = 1;
        print ++i;
        print i;
        print --i;
        {
            var j = 5;
            ++j;
            print j;
        }
    "#;
    assert_eq!(output(source), "2\n2\n1\n6\n");
}

#[test]
fn increment_needs_a_variable_target() {
    let errors = static_errors("var p; ++p.count;");
    assert_eq!(errors, vec!["[line 1] Error at '++': Invalid increment target."]);
}

#[test]
fn calls_check_arity_and_callee() {
    let (_, err) = runtime_error("fun f(a, b) {}\nf(1);");
    match err {
        RuntimeError::ArityMismatch {
            expected, received, ..
        } => assert_eq!((expected, received), (2, 1)),
        other => panic!("expected arity mismatch, got {other:?}"),
    }
    let (_, err) = runtime_error("\"text\"();");
    assert!(matches!(err, RuntimeError::NotCallable { .. }));
}

#[test]
fn arguments_evaluate_left_to_right() {
    let source = r#"
        var log = "";
        fun note(x) { log = log + x; return x; }
        fun three(a, b, c) {}
        three(note("a"), note("b"), note("c"));
        print log;
    "#;
    assert_eq!(output(source), "abc\n");
}

#[test]
fn undefined_variables_are_reported() {
    let (_, err) = runtime_error("print nope;");
    assert_eq!(err.to_string(), "Undefined variable 'nope'.");
    let (_, err) = runtime_error("nope = 1;");
    assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
}

#[test]
fn runtime_errors_keep_earlier_effects() {
    let (out, err) = runtime_error("print 1;\nprint -\"a\";\nprint 2;");
    assert_eq!(out, "1\n");
    assert_eq!(err.line(), 2);
}

#[test]
fn clock_is_a_number() {
    assert_eq!(output("print clock() > 0;"), "true\n");
}

#[test]
fn globals_persist_across_runs() {
    let (mut interpreter, sink) = interpreter(Config::default());
    driver::run_source(&mut interpreter, "var a = 1;").expect("first line");
    driver::run_source(&mut interpreter, "fun add(x, y) { return x + y; }").expect("second line");
    let err = driver::run_source(&mut interpreter, "print missing;").expect_err("third line");
    assert!(matches!(err, LoxError::Runtime(_)));
    driver::run_source(&mut interpreter, "print add(a, 2);").expect("fourth line");
    assert_eq!(sink.contents(), "3\n");
}

#[test]
fn redeclared_global_builds_on_its_previous_value() {
    assert_eq!(output("var a = 1; var a = a + 1; print a;"), "2\n");

    let (mut interpreter, sink) = interpreter(Config::default());
    driver::run_source(&mut interpreter, "var a = 1;").expect("first line");
    driver::run_source(&mut interpreter, "var a = a + 1;").expect("second line");
    driver::run_source(&mut interpreter, "print a;").expect("third line");
    assert_eq!(sink.contents(), "2\n");
}

#[test]
fn unbounded_recursion_is_fatal() {
    let (mut interpreter, sink) = interpreter(Config::default().with_max_call_depth(64));
    let err = driver::run_source(&mut interpreter, "fun f() { f(); }\nf();")
        .expect_err("recursion should abort");
    match &err {
        LoxError::Fatal(RuntimeError::StackOverflow { limit, .. }) => assert_eq!(*limit, 64),
        other => panic!("expected stack overflow, got {other:?}"),
    }
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert_eq!(sink.contents(), "");
}

#[test]
fn deep_recursion_within_the_limit_succeeds() {
    let source = r#"
        fun depth(n) {
            if (n == 0) return 0;
            return 1 + depth(n - 1);
        }
        print depth(3000);
    "#;
    assert_eq!(output(source), "3000\n");
}

#[test]
fn error_kinds_map_to_exit_codes() {
    let (_, result) = run("print (1;");
    assert_eq!(result.expect_err("syntax error").exit_code(), EXIT_STATIC_ERROR);
    let (_, result) = run("return 1;");
    assert_eq!(result.expect_err("resolve error").exit_code(), EXIT_STATIC_ERROR);
    let (_, result) = run("print -nil;");
    assert_eq!(result.expect_err("runtime error").exit_code(), EXIT_RUNTIME_ERROR);
}

#[test]
fn failing_block_leaves_the_global_scope_current() {
    let (mut interpreter, sink) = interpreter(Config::default());
    let err = driver::run_source(&mut interpreter, "{ var x = 1; print nope; }")
        .expect_err("block should fail");
    assert!(matches!(err, LoxError::Runtime(RuntimeError::UndefinedVariable { .. })));

    driver::run_source(&mut interpreter, "var y = 2; print y;").expect("global declaration");
    let err = driver::run_source(&mut interpreter, "print x;").expect_err("x was block-local");
    match err {
        LoxError::Runtime(RuntimeError::UndefinedVariable { token }) => {
            assert_eq!(token.lexeme, "x")
        }
        other => panic!("expected undefined x, got {other:?}"),
    }
    assert_eq!(sink.contents(), "2\n");
}

#[test]
fn deeply_nested_source_runs() {
    let depth = 1000;
    let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(output(&source), "1\n");

    let source = format!("print {}true;", "!".repeat(depth));
    assert_eq!(output(&source), "true\n");

    let blocks = 400;
    let source = format!("var n = 0; {} n = n + 1; {} print n;", "{".repeat(blocks), "}".repeat(blocks));
    assert_eq!(output(&source), "1\n");
}

#[test]
fn nesting_past_the_limit_is_a_static_error() {
    let source = format!("print {}true;", "!".repeat(50_000));
    assert_eq!(
        static_errors(&source),
        vec!["[line 1] Error at '!': Too much nesting."]
    );
    let (out, result) = run(&source);
    assert_eq!(result.expect_err("nesting should be rejected").exit_code(), EXIT_STATIC_ERROR);
    assert_eq!(out, "");
}
