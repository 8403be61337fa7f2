//! Round-trip tests for the formatter.
//!
//! Two invariants are checked:
//!
//! - **Idempotence**: `format(parse(format(parse(x)))) == format(parse(x))`
//!   for every input. The layout hints exist precisely so this holds.
//! - **Canonical form**: inputs that are already in canonical style come
//!   back byte-for-byte unchanged.

use difference::assert_diff;
use itertools::Itertools;

use buildfile_cst::{format_file, parse_file, prettify_error};

/// Helper to visualize whitespace differences in test output.
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn format(input: &str, label: &str) -> String {
    let file = match parse_file(input) {
        Ok(f) => f,
        Err(e) => panic!("{}", prettify_error(e, label)),
    };
    format_file(&file)
}

/// Formatting twice must give the same bytes as formatting once.
fn assert_stable(input: &str, label: &str) {
    let once = format(input, label);
    let twice = format(&once, label);
    if once != twice {
        let got = visualize(&twice);
        let expected = visualize(&once);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

/// An already-canonical input must come back unchanged (and stable).
fn assert_canonical(input: &str, label: &str) {
    let got = format(input, label);
    if got != input {
        let got = visualize(&got);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
    assert_stable(input, label);
}

fn assert_formats_to(input: &str, expected: &str, label: &str) {
    let got = format(input, label);
    if got != expected {
        let got = visualize(&got);
        let expected = visualize(expected);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
    assert_canonical(expected, label);
}

// =============================================================================
// Canonical inputs survive unchanged
// =============================================================================

#[test]
fn canonical_load_and_rule() {
    assert_canonical(
        r#"load("//tools:defs.bzl", "cc_library")

cc_library(
    name = "lib",
    srcs = [
        "a.cc",
        "b.cc",
    ],
    deps = [":base"],
)
"#,
        "load_and_rule",
    );
}

#[test]
fn canonical_assignments() {
    assert_canonical(
        r#"VERSION = "1.4"

SRCS = ["main.cc"]

COUNT = 3
"#,
        "assignments",
    );
}

#[test]
fn canonical_compact_call() {
    assert_canonical("f(1, 2, 3)\n", "compact_call");
}

#[test]
fn canonical_tuples_and_parens() {
    assert_canonical("x = (1, 2)\n", "tuple");
    assert_canonical("x = (1,)\n", "one_tuple");
    assert_canonical("x = (y)\n", "paren");
    assert_canonical("x = ()\n", "empty_tuple");
}

#[test]
fn canonical_comments() {
    assert_canonical(
        r#"# Header for the file.
load("//:defs.bzl", "rule")

# About this library.
cc_library(
    name = "lib",  # the name
    # Sources below.
    srcs = ["a.cc"],
)
"#,
        "comments",
    );
}

#[test]
fn canonical_comment_after_statement_with_blank_line() {
    assert_canonical("foo()\n# bar\n\nbaz()\n", "after_comment");
}

#[test]
fn canonical_standalone_comment_block() {
    assert_canonical("# one\n# two\n\nfoo()\n", "comment_block");
}

#[test]
fn canonical_multiline_comprehension() {
    assert_canonical(
        r#"deps = [
    dep
    for dep in all_deps
    if dep != ":bad"
]
"#,
        "multiline_comprehension",
    );
}

#[test]
fn canonical_compact_comprehension() {
    assert_canonical("srcs = [f for f in files if f != excluded]\n", "comprehension");
    assert_canonical("pairs = {k: v for k, v in items}\n", "dict_comprehension");
    assert_canonical("total = sum(x for x in xs)\n", "bare_comprehension");
}

#[test]
fn canonical_python_block() {
    assert_canonical(
        r#"def macro(name):
    native.cc_library(name = name)

macro("a")
"#,
        "python_block",
    );
}

#[test]
fn canonical_operators() {
    assert_canonical("x = a + b * c\n", "arithmetic");
    assert_canonical("x = a not in b\n", "not_in");
    assert_canonical("x = a is not b\n", "is_not");
    assert_canonical("x = a if c else b\n", "conditional");
    assert_canonical("x = src[1:9]\n", "slice");
    assert_canonical("x = cfg.name.upper()\n", "dots");
}

#[test]
fn starred_arguments_are_not_compact() {
    // Only literal and string arguments keep a call on one line.
    assert_formats_to(
        "f(*args, **kwargs)\n",
        "f(\n    *args,\n    **kwargs,\n)\n",
        "stars",
    );
}

#[test]
fn canonical_select() {
    assert_canonical(
        r#"copts = select({
    ":opt": ["-O2"],
    ":dbg": ["-g"],
})
"#,
        "select",
    );
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn rule_calls_expand_to_one_argument_per_line() {
    assert_formats_to(
        "cc_library(name = \"x\", srcs = [\"a.cc\", \"b.cc\"])\n",
        r#"cc_library(
    name = "x",
    srcs = [
        "a.cc",
        "b.cc",
    ],
)
"#,
        "expand_rule",
    );
}

#[test]
fn single_quotes_become_double_quotes() {
    assert_formats_to("x = 'abc'\n", "x = \"abc\"\n", "quotes");
}

#[test]
fn spacing_is_normalized() {
    assert_formats_to("x=1\n", "x = 1\n", "spacing");
    assert_formats_to("f( 1 )\n", "f(1)\n", "call_spacing");
}

#[test]
fn semicolons_are_dropped() {
    // The two statements shared a line, so no blank line separates them.
    assert_formats_to("foo(); bar()\n", "foo()\nbar()\n", "semicolons");
}

#[test]
fn extra_blank_lines_collapse_to_one() {
    assert_formats_to("a = 1\n\n\n\nb = 2\n", "a = 1\n\nb = 2\n", "blank_lines");
}

#[test]
fn comment_without_blank_line_stays_with_next_statement() {
    // In the tree the comment belongs to `baz()`; visibly nothing moves.
    assert_formats_to("foo()\n# bar\nbaz()\n", "foo()\n# bar\nbaz()\n", "comment_move");
}

#[test]
fn trailing_comma_forces_nothing_in_compact_lists() {
    assert_formats_to("x = [1]\n", "x = [1]\n", "list_single");
    assert_formats_to("x = [\n    1,\n]\n", "x = [\n    1,\n]\n", "list_single_multi");
}

#[test]
fn adjacent_strings_print_as_concatenation() {
    assert_formats_to("x = \"a\" \"b\"\n", "x = \"a\" + \"b\"\n", "adjacent");
}

#[test]
fn triple_quoted_strings_keep_newlines() {
    assert_canonical("doc = \"\"\"line one\nline two\"\"\"\n", "triple");
}

// =============================================================================
// Idempotence on messier inputs
// =============================================================================

#[test]
fn stable_on_mixed_real_world_file() {
    assert_stable(
        r#"# Package rules.
load("//tools:defs.bzl", "cc_library", "cc_test")

VERSION = '2.0'

def _helper(name):
    return name + "_gen"

cc_library(name = "runtime", srcs = ["a.cc", "b.cc"] + EXTRA,
    copts = select({":opt": ["-O2"], ":dbg": ["-g"]}),
    deps = [":base"] if USE_BASE else [])

cc_test(
    name = "runtime_test",  # unit tests
    srcs = [s for s in TEST_SRCS if s != "skip.cc"],
)
"#,
        "mixed",
    );
}

#[test]
fn stable_on_nested_containers() {
    assert_stable(
        "matrix = [[1, 2], [3, 4]]\nconfig = {\"a\": [1], \"b\": {\"c\": 2}}\n",
        "nested",
    );
}

#[test]
fn stable_on_comment_heavy_file() {
    assert_stable(
        r#"# top

# lead
foo(
    # inner
    arg,  # suffix
)  # call

bar()
# tail
"#,
        "comment_heavy",
    );
}

#[test]
fn format_expr_matches_statement_form() {
    use buildfile_cst::{format_expr, parse_expression};

    let x = parse_expression("glob([\"*.cc\"])").expect("parse error");
    assert_eq!(format_expr(&x), "glob([\"*.cc\"])");

    let x = parse_expression("a if b else c").expect("parse error");
    assert_eq!(format_expr(&x), "a if b else c");
}

#[test]
fn stable_on_empty_and_tiny_inputs() {
    assert_stable("", "empty");
    assert_stable("\n", "newline_only");
    assert_stable("# just a comment\n", "comment_only");
    assert_stable("x\n", "bare_ident");
}
