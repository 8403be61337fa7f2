//! Attachment of comments the grammar never sees.
//!
//! Suffix comments and full-line comments inside brackets are collected by
//! the lexer into side lists. Once the tree is built, this pass walks it
//! twice with the same deterministic traversal: first to decide, from
//! positions alone, which node owns each comment; then to attach them.
//! Attachment is total — a comment that matches no node lands in the
//! file's own comment set.

use std::collections::HashMap;

use crate::nodes::{walk_expr, Comment, Comments, Expr, Node, Position, Visitor};

/// Attaches `line_comments` and `suffix_comments` to the statements in
/// `stmts`, spilling anything unmatched into `fallback`.
///
/// Line comments attach as `before` comments of the first node (preorder)
/// that starts at or after the comment. Suffix comments attach to the
/// largest, latest node (reverse postorder) whose span ends on the
/// comment's line, at or before the comment.
pub(crate) fn assign_comments(
    stmts: &mut [Expr],
    fallback: &mut Comments,
    line_comments: Vec<Comment>,
    suffix_comments: Vec<Comment>,
) {
    if line_comments.is_empty() && suffix_comments.is_empty() {
        return;
    }

    let mut spans = SpanCollector::default();
    for stmt in stmts.iter_mut() {
        walk_expr(stmt, &mut spans);
    }

    // Line comments: consume in source order against preorder starts.
    let mut before: HashMap<usize, Vec<Comment>> = HashMap::new();
    let mut line = line_comments.into_iter().peekable();
    for (i, start) in spans.pre_starts.iter().enumerate() {
        while line.peek().is_some_and(|c| c.start.byte <= start.byte) {
            before.entry(i).or_default().push(line.next().unwrap());
        }
    }
    fallback.after.extend(line);

    // Suffix comments: consume from the back against reverse postorder.
    let mut suffix_rest = suffix_comments;
    let mut suffix: HashMap<usize, Vec<Comment>> = HashMap::new();
    for i in (0..spans.post_ends.len()).rev() {
        let end = spans.post_ends[i];
        let mut picked = Vec::new();
        while suffix_rest
            .last()
            .is_some_and(|c| end.byte <= c.start.byte && end.line == c.start.line)
        {
            picked.push(suffix_rest.pop().unwrap());
        }
        if !picked.is_empty() {
            picked.reverse();
            suffix.insert(i, picked);
        }
    }
    fallback.after.extend(suffix_rest);
    fallback.after.sort_by_key(|c| c.start.byte);

    let mut attach = CommentAttacher {
        pre_index: 0,
        post_index: 0,
        before,
        suffix,
    };
    for stmt in stmts.iter_mut() {
        walk_expr(stmt, &mut attach);
    }
}

#[derive(Default)]
struct SpanCollector {
    pre_starts: Vec<Position>,
    post_ends: Vec<Position>,
}

impl Visitor for SpanCollector {
    fn enter(&mut self, node: &mut dyn Node) {
        self.pre_starts.push(node.span().0);
    }
    fn exit(&mut self, node: &mut dyn Node) {
        self.post_ends.push(node.span().1);
    }
}

struct CommentAttacher {
    pre_index: usize,
    post_index: usize,
    before: HashMap<usize, Vec<Comment>>,
    suffix: HashMap<usize, Vec<Comment>>,
}

impl Visitor for CommentAttacher {
    fn enter(&mut self, node: &mut dyn Node) {
        if let Some(comments) = self.before.remove(&self.pre_index) {
            node.comments_mut().before.extend(comments);
        }
        self.pre_index += 1;
    }
    fn exit(&mut self, node: &mut dyn Node) {
        if let Some(comments) = self.suffix.remove(&self.post_index) {
            node.comments_mut().suffix.extend(comments);
        }
        self.post_index += 1;
    }
}
