//! End-to-end tree-shape tests: the parser's observable contract, checked
//! scenario by scenario, plus the structural invariants that hold for any
//! input (position monotonicity, comment conservation, the blank-line
//! barrier, and layout-hint stability across reformatting).

use buildfile_cst::{
    format_file, parse_expression, parse_file, walk_file, Bracket, Comment, Expr, File, Node,
    Position, Visitor,
};

fn file(text: &str) -> File {
    parse_file(text).expect("parse error")
}

fn expr(text: &str) -> Expr {
    parse_expression(text).expect("parse error")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn compact_call_of_literals() {
    let Expr::Call(c) = expr("f(1, 2, 3)") else {
        panic!("expected call")
    };
    assert_eq!(c.list.len(), 3);
    assert!(c.list.iter().all(|e| matches!(e, Expr::Literal(_))));
    assert!(c.force_compact);
    assert!(!c.force_multi_line);
}

#[test]
fn multiline_call_of_literals() {
    let Expr::Call(c) = expr("f(\n  1,\n  2,\n)") else {
        panic!("expected call")
    };
    assert_eq!(c.list.len(), 2);
    assert!(!c.force_compact);
    assert!(!c.force_multi_line);
}

#[test]
fn paren_versus_one_element_tuple() {
    assert!(matches!(expr("(x)"), Expr::Paren(_)));

    let Expr::Tuple(t) = expr("(x,)") else {
        panic!("expected tuple")
    };
    assert_eq!(t.list.len(), 1);
    assert!(!t.comma.is_absent());
}

#[test]
fn adjacent_strings_fold_into_plus_chain() {
    let Expr::Binary(outer) = expr(r#""a" "b" "c""#) else {
        panic!("expected binary")
    };
    assert_eq!(outer.op, "+");
    let Expr::Binary(inner) = &*outer.x else {
        panic!("expected nested binary")
    };
    assert_eq!(inner.op, "+");
    assert!(matches!(&*inner.x, Expr::String(s) if s.value == "a"));
    assert!(matches!(&*inner.y, Expr::String(s) if s.value == "b"));
    assert!(matches!(&*outer.y, Expr::String(s) if s.value == "c"));
}

#[test]
fn conditional_shape() {
    let Expr::Conditional(c) = expr("a if b else c") else {
        panic!("expected conditional")
    };
    assert!(matches!(&*c.then, Expr::Literal(l) if l.token == "a"));
    assert!(matches!(&*c.test, Expr::Literal(l) if l.token == "b"));
    assert!(matches!(&*c.orelse, Expr::Literal(l) if l.token == "c"));
}

#[test]
fn comment_moves_to_following_statement_without_blank_line() {
    let f = file("foo()\n# bar\nbaz()\n");
    assert_eq!(f.stmts.len(), 2);
    assert!(f.stmts[0].comments().after.is_empty());
    let before = &f.stmts[1].comments().before;
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].token, "# bar");
}

#[test]
fn blank_line_keeps_comment_on_previous_statement() {
    let f = file("foo()\n# bar\n\nbaz()\n");
    assert_eq!(f.stmts.len(), 2);
    let after = &f.stmts[0].comments().after;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].token, "# bar");
    assert!(f.stmts[1].comments().before.is_empty());
}

#[test]
fn standalone_comment_block() {
    let f = file("# one\n# two\n\nfoo()\n");
    // Separated from foo() by a blank line, the comments stay a block of
    // their own.
    assert_eq!(f.stmts.len(), 2);
    let Expr::CommentBlock(cb) = &f.stmts[0] else {
        panic!("expected comment block")
    };
    assert_eq!(cb.comments.after.len(), 2);
    assert!(f.stmts[1].comments().before.is_empty());
}

#[test]
fn not_in_and_is_not() {
    let Expr::Binary(b) = expr("x not in y") else {
        panic!("expected binary")
    };
    assert_eq!(b.op, "not in");

    let Expr::Binary(b) = expr("x is not y") else {
        panic!("expected binary")
    };
    assert_eq!(b.op, "is not");
    assert!(
        matches!(&*b.y, Expr::Literal(l) if l.token == "y"),
        "right side of 'is not' must be the bare operand"
    );
}

#[test]
fn comprehension_shape() {
    let Expr::ListFor(lf) = expr("[x for x in xs if p(x)]") else {
        panic!("expected comprehension")
    };
    assert_eq!(lf.brack, Bracket::Square);
    assert_eq!(lf.brack.as_str(), "[]");
    assert_eq!(lf.for_clauses.len(), 1);
    assert_eq!(lf.if_clauses.len(), 1);
    assert_eq!(lf.for_clauses[0].var.len(), 1);
    assert!(matches!(&*lf.if_clauses[0].cond, Expr::Call(_)));
}

// ============================================================================
// Universal properties
// ============================================================================

const REALISTIC: &str = r#"# Build rules for the runtime.
load("//tools:defs.bzl", "cc_library", "cc_test")

VERSION = "1.4"

def _impl(name):
    native.filegroup(name = name)

cc_library(
    name = "runtime",  # core target
    # Sources are globbed elsewhere.
    srcs = ["a.cc", "b.cc"] + PLATFORM_SRCS,
    copts = select({
        ":opt": ["-O2"],
        ":dbg": ["-g"],
    }),
    deps = [":base"] if USE_BASE else [],
)

cc_test(
    name = "runtime_test",
    srcs = [s for s in TEST_SRCS if s != "skip.cc"],
    tags = ("small", "fast"),
)
"#;

#[derive(Default)]
struct StartCollector {
    starts: Vec<Position>,
}

impl Visitor for StartCollector {
    fn enter(&mut self, node: &mut dyn Node) {
        self.starts.push(node.span().0);
    }
}

#[test]
fn positions_are_monotone_in_preorder() {
    let mut f = file(REALISTIC);
    let mut collector = StartCollector::default();
    walk_file(&mut f, &mut collector);
    assert!(!collector.starts.is_empty());
    for pair in collector.starts.windows(2) {
        assert!(
            (pair[0].line, pair[0].line_rune) <= (pair[1].line, pair[1].line_rune),
            "positions out of order: {} then {}",
            pair[0],
            pair[1]
        );
    }
}

#[derive(Default)]
struct CommentCollector {
    tokens: Vec<String>,
}

impl Visitor for CommentCollector {
    fn enter(&mut self, node: &mut dyn Node) {
        let c = node.comments();
        for comment in c.before.iter().chain(c.suffix.iter()).chain(c.after.iter()) {
            self.tokens.push(comment.token.clone());
        }
    }
}

fn reachable_comments(f: &mut File) -> Vec<String> {
    let mut collector = CommentCollector::default();
    walk_file(f, &mut collector);
    let file_level = f
        .comments
        .before
        .iter()
        .chain(f.comments.suffix.iter())
        .chain(f.comments.after.iter());
    for c in file_level {
        collector.tokens.push(c.token.clone());
    }
    collector.tokens.sort();
    collector.tokens
}

#[test]
fn every_comment_is_reachable_exactly_once() {
    let text = "# top\n\n# lead\nfoo(\n    # inner\n    arg,  # suffix\n)  # call\n\nbar()\n# tail\n";
    let mut f = file(text);

    let mut expected: Vec<String> = ["# top", "# lead", "# inner", "# suffix", "# call", "# tail"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    expected.sort();

    assert_eq!(reachable_comments(&mut f), expected);
}

#[test]
fn comment_conservation_on_realistic_input() {
    let input_comments = REALISTIC
        .lines()
        .filter_map(|l| {
            let trimmed = l.trim_start();
            trimmed.find('#').map(|i| trimmed[i..].to_string())
        })
        .count();
    let mut f = file(REALISTIC);
    assert_eq!(reachable_comments(&mut f).len(), input_comments);
}

#[test]
fn line_break_flag_tracks_operand_lines() {
    let Expr::Paren(p) = expr("(\"a\" +\n    \"b\")") else {
        panic!("expected paren")
    };
    let Expr::Binary(b) = &*p.x else {
        panic!("expected binary")
    };
    assert!(b.line_break);

    let Expr::Binary(b) = expr("\"a\" + \"b\"") else {
        panic!("expected binary")
    };
    assert!(!b.line_break);
}

/// Reformatting must not flip the layout hints of enclosing containers:
/// the printed file reparses with identical hints.
#[test]
fn layout_hints_survive_reformatting() {
    for text in [
        "f(1, 2, 3)\n",
        "f(\n  1,\n  2,\n)\n",
        "f((1, 2), 3)\n",
        "x = [\"a\", \"b\"]\n",
        "t = (1, 2)\n",
        "f(\n    1,\n)\n",
    ] {
        let f1 = file(text);
        let printed = format_file(&f1);
        let f2 = file(&printed);
        let hints1 = collect_hints(&f1);
        let hints2 = collect_hints(&f2);
        assert_eq!(hints1, hints2, "hints changed after reformatting {:?}", text);
    }
}

/// The (force_compact, force_multi_line) pairs of every call and tuple,
/// in statement order. Only enclosing-container stability matters here,
/// so a recursive scan over the statement expressions is enough.
fn collect_hints(f: &File) -> Vec<(bool, bool)> {
    fn scan(e: &Expr, out: &mut Vec<(bool, bool)>) {
        match e {
            Expr::Call(c) => {
                out.push((c.force_compact, c.force_multi_line));
                scan(&c.x, out);
                for a in &c.list {
                    scan(a, out);
                }
            }
            Expr::Tuple(t) => {
                out.push((t.force_compact, t.force_multi_line));
                for a in &t.list {
                    scan(a, out);
                }
            }
            Expr::Binary(b) => {
                scan(&b.x, out);
                scan(&b.y, out);
            }
            Expr::List(l) => {
                for a in &l.list {
                    scan(a, out);
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    for stmt in &f.stmts {
        scan(stmt, &mut out);
    }
    out
}

#[test]
fn comment_positions_are_absolute() {
    let f = file("foo()\n# bar\n\nbaz()\n");
    let Comment { start, token } = &f.stmts[0].comments().after[0];
    assert_eq!(token, "# bar");
    assert_eq!(
        *start,
        Position {
            line: 2,
            line_rune: 1,
            byte: 6
        }
    );
}
