use super::Compiler;
use crate::emitter::ToVmText;
use crate::error::Error;
use crate::instruction::Command;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn compile(src: &str) -> Vec<String> {
    Compiler::default()
        .compile(src)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn vm(src: &str) -> String {
    Compiler::default().compile(src).unwrap().to_vm_text()
}

fn compile_err(src: &str) -> Error {
    Compiler::default().compile(src).unwrap_err()
}

#[test]
fn test_main_print_int() {
    let src = "
class Main {
    function void main() {
        do Output.printInt(1 + 2);
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.main 0",
            "push constant 1",
            "push constant 2",
            "add",
            "call Output.printInt 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_constructor_allocates_fields() {
    let src = "
class Point {
    field int x, y;
    static int count;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        return this;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Point.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_method_binds_receiver_and_shifts_arguments() {
    let src = "
class Point {
    field int x;

    method void move(int dx, int dy) {
        let x = x + dx + dy;
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Point.move 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "add",
            "push argument 2",
            "add",
            "pop this 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_function_arguments_start_at_zero() {
    let src = "
class Math2 {
    function int add(int a, int b) {
        return a + b;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Math2.add 0",
            "push argument 0",
            "push argument 1",
            "add",
            "return",
        ]
    );
}

#[test]
fn test_implicit_method_call_pushes_receiver() {
    // getX is declared after its first use.
    let src = "
class Point {
    field int x;

    method int twice() {
        return getX() + getX();
    }

    function int helper() {
        return 1;
    }

    method int other() {
        return helper();
    }

    method int getX() {
        return x;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Point.twice 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "call Point.getX 1",
            "push pointer 0",
            "call Point.getX 1",
            "add",
            "return",
            "function Point.helper 0",
            "push constant 1",
            "return",
            "function Point.other 0",
            "push argument 0",
            "pop pointer 0",
            "call Point.helper 0",
            "return",
            "function Point.getX 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
        ]
    );
}

#[test]
fn test_call_through_object_reference() {
    let src = "
class Main {
    function void main() {
        var Point p;
        let p = Point.new(1, 2);
        do p.print();
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.main 1",
            "push constant 1",
            "push constant 2",
            "call Point.new 2",
            "pop local 0",
            "push local 0",
            "call Point.print 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_call_through_field_reference() {
    let src = "
class Line {
    field Point start;

    method void draw(int color) {
        do start.draw(color);
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Line.draw 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "call Point.draw 2",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_if_without_else() {
    let src = "
class Main {
    function int abs(int x) {
        if (x < 0) {
            let x = -x;
        }
        return x;
    }
}
";
    insta::assert_snapshot!(vm(src), @r"
    function Main.abs 0
    push argument 0
    push constant 0
    lt
    not
    if-goto IF_ELSE_0
    push argument 0
    neg
    pop argument 0
    goto IF_END_0
    label IF_ELSE_0
    label IF_END_0
    push argument 0
    return
    ");
}

#[test]
fn test_if_else() {
    let src = "
class Main {
    function int sign(int x) {
        if (x > 0) {
            return 1;
        } else {
            return 0;
        }
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.sign 0",
            "push argument 0",
            "push constant 0",
            "gt",
            "not",
            "if-goto IF_ELSE_0",
            "push constant 1",
            "return",
            "goto IF_END_0",
            "label IF_ELSE_0",
            "push constant 0",
            "return",
            "label IF_END_0",
        ]
    );
}

#[test]
fn test_while_loop() {
    let src = "
class Main {
    function int sum(int n) {
        var int i, total;
        let i = 0;
        let total = 0;
        while (i < n) {
            let total = total + i;
            let i = i + 1;
        }
        return total;
    }
}
";
    insta::assert_snapshot!(vm(src), @r"
    function Main.sum 2
    push constant 0
    pop local 0
    push constant 0
    pop local 1
    label WHILE_START_0
    push local 0
    push argument 0
    lt
    not
    if-goto WHILE_END_0
    push local 1
    push local 0
    add
    pop local 1
    push local 0
    push constant 1
    add
    pop local 0
    goto WHILE_START_0
    label WHILE_END_0
    push local 1
    return
    ");
}

#[test]
fn test_labels_are_unique_per_class() {
    let src = "
class Main {
    function void main() {
        var int i;
        while (i < 10) {
            if (i = 5) {
                let i = i + 2;
            } else {
                let i = i + 1;
            }
        }
        while (i > 0) {
            if (i = 3) {
                let i = 0;
            }
            let i = i - 1;
        }
        return;
    }
}
";
    let program = Compiler::default().compile(src).unwrap();
    let labels = program
        .iter()
        .filter_map(|command| match command {
            Command::Label(label) => Some(label.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(labels.len(), 8);
    assert_eq!(labels.iter().collect::<HashSet<_>>().len(), 8);
}

#[test]
fn test_label_counters_continue_across_subroutines() {
    let src = "
class Main {
    function void a() {
        if (true) { }
        return;
    }
    function void b() {
        if (false) { }
        while (false) { }
        return;
    }
}
";
    let lines = compile(src);
    assert!(lines.contains(&"label IF_ELSE_0".to_string()));
    assert!(lines.contains(&"label IF_ELSE_1".to_string()));
    assert!(lines.contains(&"label WHILE_START_0".to_string()));
}

#[test]
fn test_array_store_evaluates_value_first() {
    let src = "
class Main {
    function void f() {
        var Array a;
        var int i, j;
        let a[i] = a[j] + 1;
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.f 3",
            "push local 0",
            "push local 1",
            "add",
            "push local 0",
            "push local 2",
            "add",
            "pop pointer 1",
            "push that 0",
            "push constant 1",
            "add",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_operators_apply_left_to_right() {
    let src = "
class Main {
    function int f(int y, int z) {
        return 1 + 2 * 3 - (y / z) & -y | ~z;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.f 0",
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "push argument 0",
            "push argument 1",
            "call Math.divide 2",
            "sub",
            "push argument 0",
            "neg",
            "and",
            "push argument 1",
            "not",
            "or",
            "return",
        ]
    );
}

#[test]
fn test_keyword_constants() {
    let src = "
class Main {
    method void f() {
        var boolean a, b;
        var Main c, d;
        let a = true;
        let b = false;
        let c = null;
        let d = this;
        return;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Main.f 4",
            "push argument 0",
            "pop pointer 0",
            "push constant 1",
            "neg",
            "pop local 0",
            "push constant 0",
            "pop local 1",
            "push constant 0",
            "pop local 2",
            "push pointer 0",
            "pop local 3",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_string_literal() {
    let src = r#"
class Main {
    function void main() {
        do Output.printString("Hi");
        return;
    }
}
"#;
    assert_eq!(
        compile(src),
        vec![
            "function Main.main 0",
            "push constant 2",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "call Output.printString 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_statics_and_shadowing() {
    let src = "
class Counter {
    static int count;
    field int x;

    method int bump(int x) {
        let count = count + x;
        return count;
    }
}
";
    assert_eq!(
        compile(src),
        vec![
            "function Counter.bump 0",
            "push argument 0",
            "pop pointer 0",
            "push static 0",
            "push argument 1",
            "add",
            "pop static 0",
            "push static 0",
            "return",
        ]
    );
}

#[test]
fn test_subroutine_scope_is_cleared() {
    let src = "
class Main {
    function void a() {
        var int x;
        return;
    }
    function void b() {
        let x = 1;
        return;
    }
}
";
    assert!(matches!(
        compile_err(src),
        Error::UndefinedSymbol(_, name) if name == "x"
    ));
}

#[test]
fn test_undefined_symbol() {
    let src = "class Main { function void main() { let y = 1; return; } }";
    let at = src.find('y').unwrap();
    assert_eq!(
        compile_err(src),
        Error::UndefinedSymbol(at..at + 1, "y".to_string())
    );
}

#[test]
fn test_duplicate_symbol() {
    let src = "class Main { function void main() { var int a, a; return; } }";
    assert!(matches!(
        compile_err(src),
        Error::DuplicateSymbol { name, .. } if name == "a"
    ));
    let src = "class Main { field int a; static char a; }";
    assert!(matches!(
        compile_err(src),
        Error::DuplicateSymbol { name, .. } if name == "a"
    ));
}

#[test]
fn test_malformed_grammar() {
    let src = "class Main { function void main() { let = 1; return; } }";
    assert!(matches!(
        compile_err(src),
        Error::ExpectedFound { expected, found, .. }
            if expected == "identifier" && found == "="
    ));
    let src = "class Main { function void main() { return; } } extra";
    assert!(matches!(
        compile_err(src),
        Error::ExpectedFound { expected, found, .. }
            if expected == "end of input" && found == "extra"
    ));
    let src = "class Main { var int x; }";
    assert!(matches!(
        compile_err(src),
        Error::ExpectedFound { found, .. } if found == "var"
    ));
}

#[test]
fn test_truncated_input() {
    assert_eq!(compile_err(""), Error::CursorExhausted(0..0));
    let src = "class Main {";
    assert_eq!(
        compile_err(src),
        Error::CursorExhausted(src.len()..src.len())
    );
}

#[test]
fn test_lexical_errors_surface() {
    let src = "class Main { function void main() { do Output.printString(\"oops); } }";
    assert!(matches!(compile_err(src), Error::UnterminatedString(_)));
}

fn returning(expression: &str) -> String {
    format!("class Main {{ function int f() {{ return {expression}; }} }}")
}

#[test]
fn test_deep_nesting_is_an_error() {
    let depth = 20_000;
    let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert!(matches!(
        compile_err(&returning(&parens)),
        Error::NestingTooDeep(_)
    ));

    let negations = format!("{}1", "-".repeat(depth));
    assert!(matches!(
        compile_err(&returning(&negations)),
        Error::NestingTooDeep(_)
    ));

    let blocks = format!(
        "class Main {{ function void f() {{ {} return; {} return; }} }}",
        "while (true) {".repeat(depth),
        "}".repeat(depth)
    );
    assert!(matches!(compile_err(&blocks), Error::NestingTooDeep(_)));
}

#[test]
fn test_moderate_nesting_compiles() {
    let parens = format!("{}7{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(
        compile(&returning(&parens)),
        vec!["function Main.f 0", "push constant 7", "return"]
    );
}
