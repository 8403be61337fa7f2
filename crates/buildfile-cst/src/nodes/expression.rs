//! Expression and statement variants.
//!
//! BUILD files have no statement forms of their own: a top-level statement
//! is an expression, an opaque Python block, or a free-standing comment
//! block. All of them share the [`Expr`] sum type.

use super::{Comment, Comments, Node, Position};

/// A parsed expression (or top-level statement).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    String(StringExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Conditional(ConditionalExpr),
    Dot(DotExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    Lambda(LambdaExpr),
    List(ListExpr),
    Tuple(TupleExpr),
    Paren(ParenExpr),
    Dict(DictExpr),
    KeyValue(KeyValueExpr),
    ListFor(ListForExpr),
    Python(PythonBlock),
    CommentBlock(CommentBlock),
}

/// An identifier or numeric literal, kept as raw token text.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub comments: Comments,
    pub start: Position,
    pub token: String,
}

/// A string literal. `token` is the raw source (quotes, prefix and escapes
/// included) and `value` is the decoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub comments: Comments,
    pub start: Position,
    pub value: String,
    pub triple_quote: bool,
    pub token: String,
    pub end: Position,
}

/// A prefix operation: `-x`, `not x`, or `*x`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub comments: Comments,
    pub op_start: Position,
    pub op: &'static str,
    pub x: Box<Expr>,
}

/// An infix operation, including `=` and `+=` (the grammar admits them as
/// expressions). `line_break` records that the right operand started on a
/// later line than the left operand ended on.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub comments: Comments,
    pub x: Box<Expr>,
    pub op_start: Position,
    pub op: &'static str,
    pub line_break: bool,
    pub y: Box<Expr>,
}

/// The ternary form `then if test else orelse`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub comments: Comments,
    pub then: Box<Expr>,
    pub if_start: Position,
    pub test: Box<Expr>,
    pub else_start: Position,
    pub orelse: Box<Expr>,
}

/// Attribute access: `x.name`.
#[derive(Debug, Clone, PartialEq)]
pub struct DotExpr {
    pub comments: Comments,
    pub x: Box<Expr>,
    pub dot: Position,
    pub name_start: Position,
    pub name: String,
}

/// A call: `x(args...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub comments: Comments,
    pub x: Box<Expr>,
    pub list_start: Position,
    pub list: Vec<Expr>,
    pub end: Position,
    pub force_compact: bool,
    pub force_multi_line: bool,
}

/// Subscript access: `x[y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub comments: Comments,
    pub x: Box<Expr>,
    pub index_start: Position,
    pub y: Box<Expr>,
    pub end: Position,
}

/// A slice: `x[from:to]`, either bound optional.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub comments: Comments,
    pub x: Box<Expr>,
    pub slice_start: Position,
    pub from: Option<Box<Expr>>,
    pub colon: Position,
    pub to: Option<Box<Expr>>,
    pub end: Position,
}

/// `lambda params: body`. Parameters are plain expressions so defaulted
/// parameters come through as `=` binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub comments: Comments,
    pub lambda: Position,
    pub params: Vec<Expr>,
    pub colon: Position,
    pub body: Box<Expr>,
}

/// A list display `[a, b]`. `comma` is the trailing comma, absent if the
/// source had none.
#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub comments: Comments,
    pub start: Position,
    pub list: Vec<Expr>,
    pub comma: Position,
    pub end: Position,
    pub force_multi_line: bool,
}

/// A parenthesized tuple `(a, b)` or `(a,)`. The trailing comma position is
/// what distinguishes a one-element tuple from [`ParenExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr {
    pub comments: Comments,
    pub start: Position,
    pub list: Vec<Expr>,
    pub comma: Position,
    pub end: Position,
    pub force_compact: bool,
    pub force_multi_line: bool,
}

/// A parenthesized expression `(x)` with no trailing comma.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub comments: Comments,
    pub start: Position,
    pub x: Box<Expr>,
    pub end: Position,
    pub force_multi_line: bool,
}

/// A dictionary display `{k: v, ...}`. Elements are [`KeyValueExpr`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct DictExpr {
    pub comments: Comments,
    pub start: Position,
    pub list: Vec<Expr>,
    pub comma: Position,
    pub end: Position,
    pub force_multi_line: bool,
}

/// A single `key: value` entry of a dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub comments: Comments,
    pub key: Box<Expr>,
    pub colon: Position,
    pub value: Box<Expr>,
}

/// The bracket flavor of a comprehension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `[x for ...]`
    Square,
    /// `(x for ...)`
    Round,
    /// `{k: v for ...}`
    Curly,
    /// `f(x for ...)` — bare, inside a call's argument list.
    Bare,
}

impl Bracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::Square => "[]",
            Bracket::Round => "()",
            Bracket::Curly => "{}",
            Bracket::Bare => "",
        }
    }
}

/// A comprehension in any of its bracket flavors. For the bare flavor the
/// open/close positions are those of the enclosing call's parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct ListForExpr {
    pub comments: Comments,
    pub brack: Bracket,
    pub start: Position,
    pub x: Box<Expr>,
    pub for_clauses: Vec<ForClause>,
    pub if_clauses: Vec<IfClause>,
    pub end: Position,
    pub force_multi_line: bool,
}

/// One `for vars in x` clause of a comprehension. A parenthesized variable
/// tuple is flattened into the list; no TupleExpr is built for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForClause {
    pub comments: Comments,
    pub for_start: Position,
    pub var: Vec<Expr>,
    pub in_start: Position,
    pub x: Box<Expr>,
}

/// One `if cond` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub comments: Comments,
    pub if_start: Position,
    pub cond: Box<Expr>,
}

/// An opaque top-level Python block, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct PythonBlock {
    pub comments: Comments,
    pub start: Position,
    pub token: String,
}

/// A pseudo-statement holding comments that belong to no real node. Its
/// extent is synthetic: start == end.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentBlock {
    pub comments: Comments,
    pub start: Position,
}

// ============================================================================
// Span and comment access
// ============================================================================

fn rune_len(s: &str) -> usize {
    s.chars().count()
}

impl Node for LiteralExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.start.add_columns(rune_len(&self.token)))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for StringExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for UnaryExpr {
    fn span(&self) -> (Position, Position) {
        (self.op_start, self.x.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for BinaryExpr {
    fn span(&self) -> (Position, Position) {
        (self.x.span().0, self.y.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for ConditionalExpr {
    fn span(&self) -> (Position, Position) {
        (self.then.span().0, self.orelse.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for DotExpr {
    fn span(&self) -> (Position, Position) {
        (
            self.x.span().0,
            self.name_start.add_columns(rune_len(&self.name)),
        )
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for CallExpr {
    fn span(&self) -> (Position, Position) {
        (self.x.span().0, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for IndexExpr {
    fn span(&self) -> (Position, Position) {
        (self.x.span().0, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for SliceExpr {
    fn span(&self) -> (Position, Position) {
        (self.x.span().0, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for LambdaExpr {
    fn span(&self) -> (Position, Position) {
        (self.lambda, self.body.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for ListExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for TupleExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for ParenExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for DictExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for KeyValueExpr {
    fn span(&self) -> (Position, Position) {
        (self.key.span().0, self.value.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for ListForExpr {
    fn span(&self) -> (Position, Position) {
        (self.start, self.end.add_columns(1))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for ForClause {
    fn span(&self) -> (Position, Position) {
        (self.for_start, self.x.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for IfClause {
    fn span(&self) -> (Position, Position) {
        (self.if_start, self.cond.span().1)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for PythonBlock {
    fn span(&self) -> (Position, Position) {
        (self.start, self.start.advance(&self.token))
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for CommentBlock {
    fn span(&self) -> (Position, Position) {
        (self.start, self.start)
    }
    fn comments(&self) -> &Comments {
        &self.comments
    }
    fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }
}

impl Node for Expr {
    fn span(&self) -> (Position, Position) {
        match self {
            Expr::Literal(x) => x.span(),
            Expr::String(x) => x.span(),
            Expr::Unary(x) => x.span(),
            Expr::Binary(x) => x.span(),
            Expr::Conditional(x) => x.span(),
            Expr::Dot(x) => x.span(),
            Expr::Call(x) => x.span(),
            Expr::Index(x) => x.span(),
            Expr::Slice(x) => x.span(),
            Expr::Lambda(x) => x.span(),
            Expr::List(x) => x.span(),
            Expr::Tuple(x) => x.span(),
            Expr::Paren(x) => x.span(),
            Expr::Dict(x) => x.span(),
            Expr::KeyValue(x) => x.span(),
            Expr::ListFor(x) => x.span(),
            Expr::Python(x) => x.span(),
            Expr::CommentBlock(x) => x.span(),
        }
    }

    fn comments(&self) -> &Comments {
        match self {
            Expr::Literal(x) => x.comments(),
            Expr::String(x) => x.comments(),
            Expr::Unary(x) => x.comments(),
            Expr::Binary(x) => x.comments(),
            Expr::Conditional(x) => x.comments(),
            Expr::Dot(x) => x.comments(),
            Expr::Call(x) => x.comments(),
            Expr::Index(x) => x.comments(),
            Expr::Slice(x) => x.comments(),
            Expr::Lambda(x) => x.comments(),
            Expr::List(x) => x.comments(),
            Expr::Tuple(x) => x.comments(),
            Expr::Paren(x) => x.comments(),
            Expr::Dict(x) => x.comments(),
            Expr::KeyValue(x) => x.comments(),
            Expr::ListFor(x) => x.comments(),
            Expr::Python(x) => x.comments(),
            Expr::CommentBlock(x) => x.comments(),
        }
    }

    fn comments_mut(&mut self) -> &mut Comments {
        match self {
            Expr::Literal(x) => x.comments_mut(),
            Expr::String(x) => x.comments_mut(),
            Expr::Unary(x) => x.comments_mut(),
            Expr::Binary(x) => x.comments_mut(),
            Expr::Conditional(x) => x.comments_mut(),
            Expr::Dot(x) => x.comments_mut(),
            Expr::Call(x) => x.comments_mut(),
            Expr::Index(x) => x.comments_mut(),
            Expr::Slice(x) => x.comments_mut(),
            Expr::Lambda(x) => x.comments_mut(),
            Expr::List(x) => x.comments_mut(),
            Expr::Tuple(x) => x.comments_mut(),
            Expr::Paren(x) => x.comments_mut(),
            Expr::Dict(x) => x.comments_mut(),
            Expr::KeyValue(x) => x.comments_mut(),
            Expr::ListFor(x) => x.comments_mut(),
            Expr::Python(x) => x.comments_mut(),
            Expr::CommentBlock(x) => x.comments_mut(),
        }
    }
}

impl Expr {
    /// All comments held by this node, in before/suffix/after order.
    /// Useful for tests and for comment-conservation checks.
    pub fn own_comments(&self) -> impl Iterator<Item = &Comment> {
        let c = self.comments();
        c.before.iter().chain(c.suffix.iter()).chain(c.after.iter())
    }
}
