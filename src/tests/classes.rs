use super::{output, runtime_error, static_errors};
use crate::runtime::error::RuntimeError;
use pretty_assertions::assert_eq;

#[test]
fn fields_are_per_instance() {
    let source = r#"
        class Point {}
        var a = Point();
        var b = Point();
        a.x = 1;
        b.x = 2;
        print a.x + b.x;
    "#;
    assert_eq!(output(source), "3\n");
}

#[test]
fn initializer_runs_on_construction() {
    let source = r#"
        class Pair {
            init(a, b) { this.a = a; this.b = b; }
            sum() { return this.a + this.b; }
        }
        print Pair(1, 2).sum();
    "#;
    assert_eq!(output(source), "3\n");
}

#[test]
fn construction_yields_the_instance_despite_return() {
    let source = r#"
        class Early {
            init() { this.x = 1; return; this.x = 2; }
        }
        class Eager {
            init() { return 5; }
        }
        var e = Early();
        print e.x;
        print e.init();
        print Eager();
    "#;
    assert_eq!(output(source), "1\nEarly instance\nEager instance\n");
}

#[test]
fn class_arity_follows_init() {
    let (_, err) = runtime_error("class A { init(x) {} }\nA();");
    match err {
        RuntimeError::ArityMismatch {
            expected, received, ..
        } => assert_eq!((expected, received), (1, 0)),
        other => panic!("expected arity mismatch, got {other:?}"),
    }
    let (_, err) = runtime_error("class B {}\nB(1);");
    assert!(matches!(err, RuntimeError::ArityMismatch { expected: 0, .. }));
}

#[test]
fn methods_bind_this() {
    let source = r#"
        class Counter {
            init() { this.n = 0; }
            inc() { this.n = this.n + 1; return this; }
        }
        var c = Counter();
        c.inc().inc();
        var inc = c.inc;
        inc();
        print c.n;
    "#;
    assert_eq!(output(source), "3\n");
}

#[test]
fn fields_shadow_methods() {
    let source = r#"
        class Box { value() { return "method"; } }
        var b = Box();
        b.value = "field";
        print b.value;
    "#;
    assert_eq!(output(source), "field\n");
}

#[test]
fn super_calls_the_superclass_body_on_this_instance() {
    let source = r#"
        class A {
            method() { print "A method " + this.name; }
        }
        class B < A {
            init() { this.name = "b"; }
            method() { print "B method"; }
            test() { super.method(); }
        }
        B().test();
    "#;
    assert_eq!(output(source), "A method b\n");
}

#[test]
fn methods_and_init_are_inherited() {
    let source = r#"
        class A {
            init(x) { this.x = x; }
            describe() { return "x=" + this.x; }
        }
        class B < A {
            init(x, y) { super.init(x); this.y = y; }
        }
        class C < B {}
        var c = C(1, 2);
        print c.describe();
        print c.x + c.y;
    "#;
    assert_eq!(output(source), "x=1\n3\n");
}

#[test]
fn super_resolves_from_the_declaring_class() {
    let source = r#"
        class A { say() { print "A"; } }
        class B < A { say() { print "B"; super.say(); } }
        class C < B { say() { print "C"; super.say(); } }
        C().say();
    "#;
    assert_eq!(output(source), "C\nB\nA\n");
}

#[test]
fn static_methods_live_on_the_class() {
    let source = r#"
        class Math {
            static square(n) { return n * n; }
        }
        class Geometry < Math {
            static area(side) { return Math.square(side); }
        }
        print Math.square(3);
        print Geometry.square(4);
        print Geometry.area(5);
    "#;
    assert_eq!(output(source), "9\n16\n25\n");
}

#[test]
fn static_methods_are_not_reachable_through_instances() {
    let (_, err) = runtime_error("class M { static make() { return 1; } }\nM().make();");
    assert_eq!(
        err.to_string(),
        "Static method 'make' must be called on its class."
    );
}

#[test]
fn static_methods_cannot_use_this() {
    assert_eq!(
        static_errors("class M { static make() { return this; } }"),
        vec!["[line 1] Error at 'this': Can't use 'this' in a static method."]
    );
}

#[test]
fn property_errors() {
    let (_, err) = runtime_error("class P {}\nprint P().missing;");
    assert_eq!(err.to_string(), "Undefined property 'missing'.");
    assert_eq!(err.line(), 2);

    let (_, err) = runtime_error("var n = 1;\nprint n.x;");
    assert!(matches!(err, RuntimeError::InvalidReceiver { .. }));
    assert_eq!(err.to_string(), "Only instances have properties.");

    let (_, err) = runtime_error("var n = 1;\nn.x = 2;");
    assert!(matches!(err, RuntimeError::InvalidFieldTarget { .. }));
    assert_eq!(err.to_string(), "Only instances have fields.");
    assert_eq!(err.token().lexeme, "x");

    let (_, err) = runtime_error("class P {}\nprint P.missing;");
    assert!(matches!(err, RuntimeError::UndefinedProperty { .. }));
}

#[test]
fn superclass_must_be_a_class() {
    let (_, err) = runtime_error("var NotAClass = 1;\nclass B < NotAClass {}");
    assert_eq!(err.to_string(), "Superclass must be a class.");
    assert_eq!(err.token().lexeme, "NotAClass");
}

#[test]
fn set_evaluates_the_receiver_before_the_value() {
    let source = r#"
        class P {}
        var p = P();
        var log = "";
        fun receiver() { log = log + "r"; return p; }
        fun value() { log = log + "v"; return 1; }
        receiver().x = value();
        print log;
        print p.x;
    "#;
    assert_eq!(output(source), "rv\n1\n");
}

#[test]
fn instances_compare_by_identity() {
    let source = r#"
        class P {}
        var a = P();
        var b = a;
        print a == b;
        print a == P();
    "#;
    assert_eq!(output(source), "true\nfalse\n");
}
