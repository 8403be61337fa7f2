//! Tree traversal.
//!
//! A single depth-first walk drives both the comment-assignment pass and
//! the tree-invariant checks in tests. `enter` fires before a node's
//! children (preorder), `exit` after them (postorder); children are always
//! visited in source order.

use super::{Expr, File, Node};

/// Callbacks for [`walk_expr`] / [`walk_file`].
pub trait Visitor {
    fn enter(&mut self, node: &mut dyn Node) {
        let _ = node;
    }
    fn exit(&mut self, node: &mut dyn Node) {
        let _ = node;
    }
}

/// Walks every statement of a file. The [`File`] itself is not a visited
/// node; its comment set is handled by the caller.
pub fn walk_file(file: &mut File, v: &mut dyn Visitor) {
    for stmt in &mut file.stmts {
        walk_expr(stmt, v);
    }
}

/// Walks an expression tree depth-first, visiting comprehension clauses as
/// nodes of their own.
pub fn walk_expr(x: &mut Expr, v: &mut dyn Visitor) {
    v.enter(x);
    match x {
        Expr::Literal(_)
        | Expr::String(_)
        | Expr::Python(_)
        | Expr::CommentBlock(_) => {}
        Expr::Unary(u) => walk_expr(&mut u.x, v),
        Expr::Binary(b) => {
            walk_expr(&mut b.x, v);
            walk_expr(&mut b.y, v);
        }
        Expr::Conditional(c) => {
            walk_expr(&mut c.then, v);
            walk_expr(&mut c.test, v);
            walk_expr(&mut c.orelse, v);
        }
        Expr::Dot(d) => walk_expr(&mut d.x, v),
        Expr::Call(c) => {
            walk_expr(&mut c.x, v);
            for arg in &mut c.list {
                walk_expr(arg, v);
            }
        }
        Expr::Index(i) => {
            walk_expr(&mut i.x, v);
            walk_expr(&mut i.y, v);
        }
        Expr::Slice(s) => {
            walk_expr(&mut s.x, v);
            if let Some(from) = &mut s.from {
                walk_expr(from, v);
            }
            if let Some(to) = &mut s.to {
                walk_expr(to, v);
            }
        }
        Expr::Lambda(l) => {
            for p in &mut l.params {
                walk_expr(p, v);
            }
            walk_expr(&mut l.body, v);
        }
        Expr::List(l) => {
            for e in &mut l.list {
                walk_expr(e, v);
            }
        }
        Expr::Tuple(t) => {
            for e in &mut t.list {
                walk_expr(e, v);
            }
        }
        Expr::Paren(p) => walk_expr(&mut p.x, v),
        Expr::Dict(d) => {
            for e in &mut d.list {
                walk_expr(e, v);
            }
        }
        Expr::KeyValue(kv) => {
            walk_expr(&mut kv.key, v);
            walk_expr(&mut kv.value, v);
        }
        Expr::ListFor(lf) => {
            walk_expr(&mut lf.x, v);
            for fc in &mut lf.for_clauses {
                v.enter(fc);
                for var in &mut fc.var {
                    walk_expr(var, v);
                }
                walk_expr(&mut fc.x, v);
                v.exit(fc);
            }
            for ic in &mut lf.if_clauses {
                v.enter(ic);
                walk_expr(&mut ic.cond, v);
                v.exit(ic);
            }
        }
    }
    v.exit(x);
}
