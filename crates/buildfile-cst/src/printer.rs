//! Canonical formatting of a parsed tree.
//!
//! The printer never measures line widths; its layout decisions come from
//! element counts and the `force_compact` / `force_multi_line` hints the
//! parser recorded, which is what makes formatting idempotent: printing a
//! file, reparsing it and printing again yields the same bytes.
//!
//! Layout rules:
//! - four-space indentation, one trailing newline;
//! - a sequence prints on one line when `force_compact` is set or it has
//!   at most one comment-free element (and `force_multi_line` is unset);
//!   otherwise one element per line, each with a trailing comma;
//! - statements separated by a blank line in the source keep exactly one;
//! - strings are re-quoted with double quotes; Python blocks are verbatim.

use crate::nodes::{
    Bracket, Comment, Expr, File, ForClause, IfClause, ListForExpr, Node, ParenExpr,
};
use crate::tokenizer::quote::quote;

/// Formats a whole file.
pub fn format_file(file: &File) -> String {
    let mut p = Printer::default();
    p.file(file);
    p.out
}

/// Formats a single expression, without a trailing newline.
pub fn format_expr(x: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(x, 0);
    p.out
}

const INDENT: usize = 4;

fn op_prec(op: &str) -> u8 {
    match op {
        "=" | "+=" => 1,
        "in" | "not in" | "is" | "is not" => 3,
        "or" => 4,
        "and" => 5,
        "<" | ">" | "==" | "!=" | "<=" | ">=" => 6,
        "+" | "-" => 7,
        _ => 8,
    }
}

/// The binding power of a printed expression, mirroring the parser's
/// table; anything below the context's requirement gets parenthesized.
fn precedence(v: &Expr) -> u8 {
    match v {
        Expr::Lambda(_) => 1,
        Expr::Conditional(_) => 2,
        Expr::Binary(b) => op_prec(b.op),
        Expr::Dot(_) | Expr::Call(_) | Expr::Index(_) | Expr::Slice(_) => 9,
        Expr::Unary(_) => 10,
        _ => 11,
    }
}

fn has_element_comments(list: &[Expr]) -> bool {
    list.iter().any(|e| {
        let c = e.comments();
        !c.before.is_empty() || !c.suffix.is_empty()
    })
}

#[derive(Default)]
struct Printer {
    out: String,
    margin: usize,
}

impl Printer {
    fn spaces(&mut self, n: usize) {
        for _ in 0..n {
            self.out.push(' ');
        }
    }

    /// Starts a new line at the current margin.
    fn nl(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        self.out.push('\n');
        let n = self.margin;
        self.spaces(n);
    }

    fn comment_line(&mut self, c: &Comment) {
        self.out.push_str(&c.token);
        self.nl();
    }

    fn suffix_comments(&mut self, comments: &[Comment]) {
        for c in comments {
            self.out.push_str("  ");
            self.out.push_str(&c.token);
        }
    }

    // ------------------------------------------------------------------
    // File and statements
    // ------------------------------------------------------------------

    fn file(&mut self, file: &File) {
        let mut prev_end_line: Option<usize> = None;
        for stmt in &file.stmts {
            if let Some(prev) = prev_end_line {
                if stmt_start_line(stmt) > prev + 1 {
                    self.out.push('\n');
                }
            }
            self.statement(stmt);
            prev_end_line = Some(stmt_end_line(stmt));
        }
        for c in &file.comments.after {
            self.out.push_str(&c.token);
            self.out.push('\n');
        }
    }

    fn statement(&mut self, stmt: &Expr) {
        for c in &stmt.comments().before {
            self.comment_line(c);
        }
        if let Expr::CommentBlock(cb) = stmt {
            for c in &cb.comments.after {
                self.comment_line(c);
            }
            return;
        }
        self.expr(stmt, 0);
        self.suffix_comments(&stmt.comments().suffix);
        self.nl();
        for c in &stmt.comments().after {
            self.comment_line(c);
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self, v: &Expr, outer: u8) {
        let needs_paren = precedence(v) < outer;
        if needs_paren {
            self.out.push('(');
        }
        match v {
            Expr::Literal(x) => self.out.push_str(&x.token),
            Expr::String(x) => {
                let quoted = quote(&x.value, x.triple_quote);
                self.out.push_str(&quoted);
            }
            Expr::Python(x) => self.out.push_str(&x.token),
            Expr::CommentBlock(_) => {}
            Expr::Unary(x) => {
                self.out.push_str(x.op);
                if x.op == "not" {
                    self.out.push(' ');
                }
                self.expr(&x.x, 10);
            }
            Expr::Binary(x) => {
                let p = op_prec(x.op);
                self.expr(&x.x, p);
                self.out.push(' ');
                self.out.push_str(x.op);
                if x.line_break {
                    self.out.push('\n');
                    let n = self.margin + INDENT;
                    self.spaces(n);
                } else {
                    self.out.push(' ');
                }
                self.expr(&x.y, p + 1);
            }
            Expr::Conditional(x) => {
                self.expr(&x.then, 3);
                self.out.push_str(" if ");
                self.expr(&x.test, 3);
                self.out.push_str(" else ");
                self.expr(&x.orelse, 2);
            }
            Expr::Dot(x) => {
                self.expr(&x.x, 9);
                self.out.push('.');
                self.out.push_str(&x.name);
            }
            Expr::Index(x) => {
                self.expr(&x.x, 9);
                self.out.push('[');
                self.expr(&x.y, 1);
                self.out.push(']');
            }
            Expr::Slice(x) => {
                self.expr(&x.x, 9);
                self.out.push('[');
                if let Some(from) = &x.from {
                    self.expr(from, 1);
                }
                self.out.push(':');
                if let Some(to) = &x.to {
                    self.expr(to, 1);
                }
                self.out.push(']');
            }
            Expr::Lambda(x) => {
                self.out.push_str("lambda");
                for (i, param) in x.params.iter().enumerate() {
                    self.out.push_str(if i == 0 { " " } else { ", " });
                    self.expr(param, 1);
                }
                self.out.push_str(": ");
                self.expr(&x.body, 1);
            }
            Expr::Call(x) => {
                self.expr(&x.x, 9);
                self.seq(
                    '(',
                    ')',
                    &x.list,
                    x.force_compact,
                    x.force_multi_line,
                    false,
                );
            }
            Expr::List(x) => {
                self.seq('[', ']', &x.list, false, x.force_multi_line, false);
            }
            Expr::Tuple(x) => {
                let keep_comma = x.list.len() == 1 && !x.comma.is_absent();
                self.seq(
                    '(',
                    ')',
                    &x.list,
                    x.force_compact,
                    x.force_multi_line,
                    keep_comma,
                );
            }
            Expr::Dict(x) => {
                self.seq('{', '}', &x.list, false, x.force_multi_line, false);
            }
            Expr::KeyValue(x) => {
                self.expr(&x.key, 1);
                self.out.push_str(": ");
                self.expr(&x.value, 1);
            }
            Expr::Paren(x) => self.paren(x),
            Expr::ListFor(x) => self.list_for(x),
        }
        if needs_paren {
            self.out.push(')');
        }
    }

    /// Prints a bracketed, comma-separated sequence. Compact layout keeps
    /// everything on one line; multiline layout gives every element its own
    /// line, a trailing comma, and its comments.
    fn seq(
        &mut self,
        open: char,
        close: char,
        list: &[Expr],
        force_compact: bool,
        force_multi_line: bool,
        single_trailing_comma: bool,
    ) {
        let compact = !force_multi_line
            && !has_element_comments(list)
            && (force_compact || list.len() <= 1);

        self.out.push(open);
        if compact {
            for (i, elem) in list.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.expr(elem, 1);
            }
            if single_trailing_comma && list.len() == 1 {
                self.out.push(',');
            }
            self.out.push(close);
            return;
        }

        if list.is_empty() {
            self.nl();
            self.out.push(close);
            return;
        }

        self.margin += INDENT;
        for elem in list {
            self.nl();
            for c in &elem.comments().before {
                self.comment_line(c);
            }
            self.expr(elem, 1);
            self.out.push(',');
            self.suffix_comments(&elem.comments().suffix);
        }
        self.margin -= INDENT;
        self.nl();
        self.out.push(close);
    }

    fn paren(&mut self, x: &ParenExpr) {
        let multiline = x.force_multi_line || !x.x.comments().is_empty();
        self.out.push('(');
        if multiline {
            self.margin += INDENT;
            self.nl();
            for c in &x.x.comments().before {
                self.comment_line(c);
            }
            self.expr(&x.x, 1);
            self.suffix_comments(&x.x.comments().suffix);
            self.margin -= INDENT;
            self.nl();
        } else {
            self.expr(&x.x, 1);
        }
        self.out.push(')');
    }

    fn list_for(&mut self, x: &ListForExpr) {
        let (open, close) = match x.brack {
            Bracket::Square => ("[", "]"),
            Bracket::Round => ("(", ")"),
            Bracket::Curly => ("{", "}"),
            Bracket::Bare => ("", ""),
        };
        let clause_comments = !x.x.comments().is_empty()
            || x.for_clauses.iter().any(|f| !f.comments.is_empty())
            || x.if_clauses.iter().any(|f| !f.comments.is_empty());
        let multiline = x.force_multi_line || clause_comments;

        self.out.push_str(open);
        if multiline {
            self.margin += INDENT;
            self.nl();
            for c in &x.x.comments().before {
                self.comment_line(c);
            }
            self.expr(&x.x, 1);
            self.suffix_comments(&x.x.comments().suffix);
            for f in &x.for_clauses {
                self.nl();
                for c in &f.comments.before {
                    self.comment_line(c);
                }
                self.for_clause(f);
                self.suffix_comments(&f.comments.suffix);
            }
            for f in &x.if_clauses {
                self.nl();
                for c in &f.comments.before {
                    self.comment_line(c);
                }
                self.if_clause(f);
                self.suffix_comments(&f.comments.suffix);
            }
            self.margin -= INDENT;
            self.nl();
        } else {
            self.expr(&x.x, 1);
            for f in &x.for_clauses {
                self.out.push(' ');
                self.for_clause(f);
            }
            for f in &x.if_clauses {
                self.out.push(' ');
                self.if_clause(f);
            }
        }
        self.out.push_str(close);
    }

    fn for_clause(&mut self, f: &ForClause) {
        self.out.push_str("for ");
        for (i, var) in f.var.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(var, 1);
        }
        self.out.push_str(" in ");
        self.expr(&f.x, 4);
    }

    fn if_clause(&mut self, f: &IfClause) {
        self.out.push_str("if ");
        self.expr(&f.cond, 3);
    }
}

/// The line a statement visually starts on, counting its leading comments.
fn stmt_start_line(stmt: &Expr) -> usize {
    stmt.comments()
        .before
        .first()
        .map(|c| c.start.line)
        .unwrap_or_else(|| stmt.span().0.line)
}

/// The line a statement visually ends on, counting trailing comments.
fn stmt_end_line(stmt: &Expr) -> usize {
    let mut end = stmt.span().1.line;
    let comments = stmt.comments();
    for c in comments.suffix.iter().chain(comments.after.iter()) {
        end = end.max(c.start.line);
    }
    end
}
