//! The grammar driver: a recursive-descent statement parser over a
//! precedence-climbing expression core.
//!
//! Binding powers, lowest to highest (left-associative unless noted):
//!
//! | prec | operators |
//! |------|-----------|
//! | 1    | `=` `+=` |
//! | 2    | ternary `if`/`else` (right-chaining) |
//! | 3    | `in` `not in` `is` `is not` |
//! | 4    | `or` |
//! | 5    | `and` |
//! | 6    | `<` `>` `==` `!=` `<=` `>=` |
//! | 7    | `+` `-` |
//! | 8    | `*` `/` `%` |
//! | 9    | postfix `.` `[` `(` |
//! | 10   | unary `-` `not` `*` (right-assoc, tighter than postfix) |
//!
//! Adjacent string literals bind tightest of all and are folded into `+`
//! chains at the atom level. Commas, colons and newlines are structural
//! delimiters, not operators.

use crate::nodes::{
    Bracket, CallExpr, Comment, CommentBlock, Comments, ConditionalExpr, DictExpr, DotExpr, Expr,
    File, ForClause, IfClause, IndexExpr, KeyValueExpr, LambdaExpr, ListExpr, ListForExpr,
    LiteralExpr, Node, ParenExpr, Position, PythonBlock, SliceExpr, StringExpr, TupleExpr,
    UnaryExpr,
};
use crate::parser::comments::assign_comments;
use crate::parser::errors::{ParserError, Result};
use crate::tokenizer::{Token, TokenKind, TokenStream};

const PREC_ASSIGN: u8 = 1;
const PREC_TERNARY: u8 = 2;
const PREC_TEST: u8 = 3;
const PREC_OR: u8 = 4;
const PREC_POSTFIX: u8 = 9;

fn binary_prec(kind: TokenKind) -> Option<(u8, &'static str)> {
    Some(match kind {
        TokenKind::Assign => (PREC_ASSIGN, "="),
        TokenKind::PlusEq => (PREC_ASSIGN, "+="),
        TokenKind::In => (PREC_TEST, "in"),
        TokenKind::Is => (PREC_TEST, "is"),
        TokenKind::Or => (PREC_OR, "or"),
        TokenKind::And => (5, "and"),
        TokenKind::Lt => (6, "<"),
        TokenKind::Gt => (6, ">"),
        TokenKind::EqEq => (6, "=="),
        TokenKind::Ne => (6, "!="),
        TokenKind::Le => (6, "<="),
        TokenKind::Ge => (6, ">="),
        TokenKind::Plus => (7, "+"),
        TokenKind::Minus => (7, "-"),
        TokenKind::Star => (8, "*"),
        TokenKind::Slash => (8, "/"),
        TokenKind::Percent => (8, "%"),
        _ => return None,
    })
}

/// Builds a BinaryExpr, deriving the `line_break` flag from the operand
/// positions: set iff the left operand ends on an earlier line than the
/// right operand starts on.
fn binary(x: Expr, op_start: Position, op: &'static str, y: Expr) -> Expr {
    let line_break = x.span().1.line < y.span().0.line;
    Expr::Binary(crate::nodes::BinaryExpr {
        comments: Comments::default(),
        x: Box::new(x),
        op_start,
        op,
        line_break,
        y: Box::new(y),
    })
}

// ============================================================================
// Layout hints
// ============================================================================

/// Whether a call or tuple should be kept on one line even though it has
/// several elements. Only uses properties that survive reformatting of
/// nested structures: the opening bracket and first element share a line,
/// each later element starts on the line the previous one ended on, every
/// element is a plain literal or string, and the closing bracket shares the
/// last element's line.
pub(crate) fn force_compact(start: Position, list: &[Expr], end: Position) -> bool {
    if list.len() <= 1 {
        return false;
    }
    let mut line = start.line;
    for x in list {
        let (xstart, xend) = x.span();
        if xstart.line != line {
            return false;
        }
        match x {
            Expr::Literal(_) | Expr::String(_) => {}
            _ => return false,
        }
        line = xend.line;
    }
    end.line == line
}

/// Whether a container with at most one element should still break after
/// its opening bracket. With two or more elements the printer breaks
/// anyway, so the hint is always false there.
pub(crate) fn force_multi_line(start: Position, list: &[Expr], end: Position) -> bool {
    if list.len() > 1 {
        return false;
    }
    match list.first() {
        None => start.line != end.line,
        Some(x) => {
            let (xstart, xend) = x.span();
            start.line != xstart.line || end.line != xend.line
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// A single-use parser over one token stream.
pub struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    line_comments: Vec<Comment>,
    suffix_comments: Vec<Comment>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, stream: TokenStream<'a>) -> Parser<'a> {
        Parser {
            text,
            tokens: stream.tokens,
            line_comments: stream.line_comments,
            suffix_comments: stream.suffix_comments,
            pos: 0,
        }
    }

    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, n: usize) -> TokenKind {
        self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &'static str) -> ParserError<'a> {
        let tok = self.peek();
        let found = match tok.kind {
            TokenKind::Ident | TokenKind::Str => {
                format!("{} '{}'", tok.kind.describe(), tok.text)
            }
            _ => tok.kind.describe().to_string(),
        };
        ParserError::Syntax {
            pos: tok.start,
            found,
            expected,
            module_text: self.text,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<'a, Token<'a>> {
        if self.peek_kind() == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Parses the whole token stream as a file.
    ///
    /// Comment attachment runs inline: `last_rule` tracks the most recent
    /// statement-producing node, a blank line resets it, statement-level
    /// comment tokens accumulate on it (or on a fresh CommentBlock), and a
    /// new statement adopts any comments that piled up directly above it.
    pub fn into_file(mut self) -> Result<'a, File> {
        let mut file = File::default();
        let mut last_rule: Option<usize> = None;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    // A newline token at statement level is a blank line;
                    // it severs comment flow between paragraphs.
                    self.bump();
                    last_rule = None;
                }
                TokenKind::Semi => {
                    self.bump();
                }
                TokenKind::Comment => {
                    let tok = self.bump();
                    let idx = match last_rule {
                        Some(i) => i,
                        None => {
                            file.stmts.push(Expr::CommentBlock(CommentBlock {
                                comments: Comments::default(),
                                start: tok.start,
                            }));
                            file.stmts.len() - 1
                        }
                    };
                    last_rule = Some(idx);
                    file.stmts[idx].comments_mut().after.push(Comment {
                        start: tok.start,
                        token: tok.text.to_string(),
                    });
                }
                _ => {
                    let mut stmt = self.parse_statement()?;
                    match self.peek_kind() {
                        TokenKind::Newline => {
                            self.bump();
                        }
                        TokenKind::Semi => {
                            // Trailing semicolons are accepted but never
                            // preserved; another statement may follow on
                            // the same line.
                            self.bump();
                            if self.peek_kind() == TokenKind::Newline {
                                self.bump();
                            }
                        }
                        TokenKind::Eof => {}
                        _ => return Err(self.unexpected("newline after statement")),
                    }
                    match last_rule {
                        Some(i) if matches!(file.stmts[i], Expr::CommentBlock(_)) => {
                            // The comment block was really a prelude to
                            // this statement.
                            let Expr::CommentBlock(cb) = file.stmts.remove(i) else {
                                unreachable!()
                            };
                            stmt.comments_mut().before.extend(cb.comments.after);
                        }
                        Some(i) => {
                            let after =
                                std::mem::take(&mut file.stmts[i].comments_mut().after);
                            stmt.comments_mut().before.extend(after);
                        }
                        None => {}
                    }
                    file.stmts.push(stmt);
                    last_rule = Some(file.stmts.len() - 1);
                }
            }
        }

        let line = std::mem::take(&mut self.line_comments);
        let suffix = std::mem::take(&mut self.suffix_comments);
        assign_comments(&mut file.stmts, &mut file.comments, line, suffix);
        Ok(file)
    }

    /// Parses the token stream as a single expression.
    pub fn into_expression(mut self) -> Result<'a, Expr> {
        let mut x = self.parse_expr(PREC_ASSIGN)?;
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semi) {
            self.bump();
        }
        if self.peek_kind() != TokenKind::Eof {
            return Err(self.unexpected("end of expression"));
        }
        let line = std::mem::take(&mut self.line_comments);
        let suffix = std::mem::take(&mut self.suffix_comments);
        let mut spill = Comments::default();
        assign_comments(std::slice::from_mut(&mut x), &mut spill, line, suffix);
        x.comments_mut().after.extend(spill.after);
        Ok(x)
    }

    fn parse_statement(&mut self) -> Result<'a, Expr> {
        if self.peek_kind() == TokenKind::Python {
            let tok = self.bump();
            return Ok(Expr::Python(PythonBlock {
                comments: Comments::default(),
                start: tok.start,
                token: tok.text.to_string(),
            }));
        }
        self.parse_expr(PREC_ASSIGN)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self, min: u8) -> Result<'a, Expr> {
        let mut x = self.parse_unary()?;
        loop {
            let kind = self.peek_kind();

            if kind == TokenKind::If && min <= PREC_TERNARY {
                let if_tok = self.bump();
                let test = self.parse_expr(PREC_TEST)?;
                let else_tok = self.expect(TokenKind::Else, "'else' of conditional")?;
                let orelse = self.parse_expr(PREC_TERNARY)?;
                x = Expr::Conditional(ConditionalExpr {
                    comments: Comments::default(),
                    then: Box::new(x),
                    if_start: if_tok.start,
                    test: Box::new(test),
                    else_start: else_tok.start,
                    orelse: Box::new(orelse),
                });
                continue;
            }

            if kind == TokenKind::Not && self.peek_kind_at(1) == TokenKind::In {
                if PREC_TEST < min {
                    break;
                }
                let not_tok = self.bump();
                self.bump(); // the 'in'
                let y = self.parse_expr(PREC_TEST + 1)?;
                x = binary(x, not_tok.start, "not in", y);
                continue;
            }

            let Some((p, op)) = binary_prec(kind) else { break };
            if p < min {
                break;
            }
            let op_tok = self.bump();
            let y = self.parse_expr(p + 1)?;
            // `x is not y` arrives as `is` applied to a unary `not`;
            // normalize it to a single operator.
            let (op, y) = if op == "is" {
                match y {
                    Expr::Unary(u) if u.op == "not" => ("is not", *u.x),
                    other => ("is", other),
                }
            } else {
                (op, y)
            };
            x = binary(x, op_tok.start, op, y);
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> Result<'a, Expr> {
        let x = self.parse_unary_operand()?;
        self.parse_postfix(x)
    }

    /// A unary chain over a bare atom. Postfix operators are applied by
    /// the caller, to the whole chain: unary binds tighter than postfix.
    fn parse_unary_operand(&mut self) -> Result<'a, Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => "-",
            TokenKind::Not => "not",
            TokenKind::Star => "*",
            _ => return self.parse_atom(),
        };
        let tok = self.bump();
        let x = self.parse_unary_operand()?;
        Ok(Expr::Unary(UnaryExpr {
            comments: Comments::default(),
            op_start: tok.start,
            op,
            x: Box::new(x),
        }))
    }

    fn parse_postfix(&mut self, mut x: Expr) -> Result<'a, Expr> {
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    let dot = self.bump();
                    let name = self.expect(TokenKind::Ident, "attribute name after '.'")?;
                    x = Expr::Dot(DotExpr {
                        comments: Comments::default(),
                        x: Box::new(x),
                        dot: dot.start,
                        name_start: name.start,
                        name: name.text.to_string(),
                    });
                }
                TokenKind::LParen => x = self.parse_call(x)?,
                TokenKind::LBracket => x = self.parse_subscript(x)?,
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_atom(&mut self) -> Result<'a, Expr> {
        match self.peek_kind() {
            TokenKind::Ident => {
                let tok = self.bump();
                Ok(Expr::Literal(LiteralExpr {
                    comments: Comments::default(),
                    start: tok.start,
                    token: tok.text.to_string(),
                }))
            }
            TokenKind::Str => {
                // Adjacent strings fold left-to-right into a `+` chain,
                // the operator position borrowed from the left operand's
                // end.
                let mut x = self.string_atom();
                while self.peek_kind() == TokenKind::Str {
                    let op_start = x.span().1;
                    let y = self.string_atom();
                    x = binary(x, op_start, "+", y);
                }
                Ok(x)
            }
            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            TokenKind::Lambda => self.parse_lambda(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn string_atom(&mut self) -> Expr {
        let tok = self.bump();
        Expr::String(StringExpr {
            comments: Comments::default(),
            start: tok.start,
            value: tok.value.unwrap_or_default(),
            triple_quote: tok.triple_quote,
            token: tok.text.to_string(),
            end: tok.end,
        })
    }

    // ------------------------------------------------------------------
    // Bracketed forms
    // ------------------------------------------------------------------

    /// Finishes a comma-separated sequence whose first element is already
    /// parsed. Returns the elements, the trailing comma position (absent
    /// if there was none) and the closing token.
    fn finish_seq(
        &mut self,
        first: Expr,
        close_kind: TokenKind,
        expected: &'static str,
        elem: fn(&mut Self) -> Result<'a, Expr>,
    ) -> Result<'a, (Vec<Expr>, Position, Token<'a>)> {
        let mut list = vec![first];
        let mut comma = Position::ABSENT;
        loop {
            let kind = self.peek_kind();
            if kind == close_kind {
                break;
            }
            if kind != TokenKind::Comma {
                return Err(self.unexpected(expected));
            }
            let c = self.bump();
            if self.peek_kind() == close_kind {
                comma = c.start;
                break;
            }
            list.push(elem(self)?);
        }
        let close = self.bump();
        Ok((list, comma, close))
    }

    fn parse_element(&mut self) -> Result<'a, Expr> {
        self.parse_expr(PREC_ASSIGN)
    }

    fn parse_dict_entry(&mut self) -> Result<'a, Expr> {
        let key = self.parse_expr(PREC_ASSIGN)?;
        let colon = self.expect(TokenKind::Colon, "':' in dictionary entry")?;
        let value = self.parse_expr(PREC_ASSIGN)?;
        Ok(Expr::KeyValue(KeyValueExpr {
            comments: Comments::default(),
            key: Box::new(key),
            colon: colon.start,
            value: Box::new(value),
        }))
    }

    fn parse_call(&mut self, callee: Expr) -> Result<'a, Expr> {
        let open = self.bump();
        let (list, close) = if self.peek_kind() == TokenKind::RParen {
            (Vec::new(), self.bump())
        } else {
            let first = self.parse_expr(PREC_ASSIGN)?;
            if self.peek_kind() == TokenKind::For {
                // Bare comprehension: the call's only argument.
                let fml = open.start.line != first.span().0.line;
                let (for_clauses, if_clauses) = self.parse_comp_clauses()?;
                let close = self.expect(TokenKind::RParen, "')' closing call")?;
                let lf = Expr::ListFor(ListForExpr {
                    comments: Comments::default(),
                    brack: Bracket::Bare,
                    start: open.start,
                    x: Box::new(first),
                    for_clauses,
                    if_clauses,
                    end: close.start,
                    force_multi_line: fml,
                });
                (vec![lf], close)
            } else {
                let (list, _comma, close) = self.finish_seq(
                    first,
                    TokenKind::RParen,
                    "',' or ')' in call arguments",
                    Self::parse_element,
                )?;
                (list, close)
            }
        };
        let fc = force_compact(open.start, &list, close.start);
        let fml = force_multi_line(open.start, &list, close.start);
        Ok(Expr::Call(CallExpr {
            comments: Comments::default(),
            x: Box::new(callee),
            list_start: open.start,
            list,
            end: close.start,
            force_compact: fc,
            force_multi_line: fml,
        }))
    }

    fn parse_subscript(&mut self, x: Expr) -> Result<'a, Expr> {
        let open = self.bump();
        if self.peek_kind() == TokenKind::Colon {
            let colon = self.bump();
            let to = if self.peek_kind() == TokenKind::RBracket {
                None
            } else {
                Some(Box::new(self.parse_expr(PREC_ASSIGN)?))
            };
            let close = self.expect(TokenKind::RBracket, "']' closing slice")?;
            return Ok(Expr::Slice(SliceExpr {
                comments: Comments::default(),
                x: Box::new(x),
                slice_start: open.start,
                from: None,
                colon: colon.start,
                to,
                end: close.start,
            }));
        }
        let first = self.parse_expr(PREC_ASSIGN)?;
        if self.peek_kind() == TokenKind::Colon {
            let colon = self.bump();
            let to = if self.peek_kind() == TokenKind::RBracket {
                None
            } else {
                Some(Box::new(self.parse_expr(PREC_ASSIGN)?))
            };
            let close = self.expect(TokenKind::RBracket, "']' closing slice")?;
            return Ok(Expr::Slice(SliceExpr {
                comments: Comments::default(),
                x: Box::new(x),
                slice_start: open.start,
                from: Some(Box::new(first)),
                colon: colon.start,
                to,
                end: close.start,
            }));
        }
        let close = self.expect(TokenKind::RBracket, "']' closing index")?;
        Ok(Expr::Index(IndexExpr {
            comments: Comments::default(),
            x: Box::new(x),
            index_start: open.start,
            y: Box::new(first),
            end: close.start,
        }))
    }

    fn parse_list(&mut self) -> Result<'a, Expr> {
        let open = self.bump();
        if self.peek_kind() == TokenKind::RBracket {
            let close = self.bump();
            return Ok(Expr::List(ListExpr {
                comments: Comments::default(),
                start: open.start,
                list: Vec::new(),
                comma: Position::ABSENT,
                end: close.start,
                force_multi_line: force_multi_line(open.start, &[], close.start),
            }));
        }
        let first = self.parse_expr(PREC_ASSIGN)?;
        if self.peek_kind() == TokenKind::For {
            return self.finish_comprehension(Bracket::Square, open, first);
        }
        let (list, comma, close) = self.finish_seq(
            first,
            TokenKind::RBracket,
            "',' or ']' in list",
            Self::parse_element,
        )?;
        let fml = force_multi_line(open.start, &list, close.start);
        Ok(Expr::List(ListExpr {
            comments: Comments::default(),
            start: open.start,
            list,
            comma,
            end: close.start,
            force_multi_line: fml,
        }))
    }

    fn parse_paren_or_tuple(&mut self) -> Result<'a, Expr> {
        let open = self.bump();
        if self.peek_kind() == TokenKind::RParen {
            let close = self.bump();
            return Ok(Expr::Tuple(TupleExpr {
                comments: Comments::default(),
                start: open.start,
                list: Vec::new(),
                comma: Position::ABSENT,
                end: close.start,
                force_compact: false,
                force_multi_line: force_multi_line(open.start, &[], close.start),
            }));
        }
        let first = self.parse_expr(PREC_ASSIGN)?;
        match self.peek_kind() {
            TokenKind::For => self.finish_comprehension(Bracket::Round, open, first),
            TokenKind::Comma => {
                // A comma makes it a tuple; without one it stays a
                // parenthesized expression.
                let (list, comma, close) = self.finish_seq(
                    first,
                    TokenKind::RParen,
                    "',' or ')' in tuple",
                    Self::parse_element,
                )?;
                let fc = force_compact(open.start, &list, close.start);
                let fml = force_multi_line(open.start, &list, close.start);
                Ok(Expr::Tuple(TupleExpr {
                    comments: Comments::default(),
                    start: open.start,
                    list,
                    comma,
                    end: close.start,
                    force_compact: fc,
                    force_multi_line: fml,
                }))
            }
            TokenKind::RParen => {
                let close = self.bump();
                let fml =
                    force_multi_line(open.start, std::slice::from_ref(&first), close.start);
                Ok(Expr::Paren(ParenExpr {
                    comments: Comments::default(),
                    start: open.start,
                    x: Box::new(first),
                    end: close.start,
                    force_multi_line: fml,
                }))
            }
            _ => Err(self.unexpected("',' or ')'")),
        }
    }

    fn parse_dict(&mut self) -> Result<'a, Expr> {
        let open = self.bump();
        if self.peek_kind() == TokenKind::RBrace {
            let close = self.bump();
            return Ok(Expr::Dict(DictExpr {
                comments: Comments::default(),
                start: open.start,
                list: Vec::new(),
                comma: Position::ABSENT,
                end: close.start,
                force_multi_line: force_multi_line(open.start, &[], close.start),
            }));
        }
        let first = self.parse_dict_entry()?;
        if self.peek_kind() == TokenKind::For {
            return self.finish_comprehension(Bracket::Curly, open, first);
        }
        let (list, comma, close) = self.finish_seq(
            first,
            TokenKind::RBrace,
            "',' or '}' in dictionary",
            Self::parse_dict_entry,
        )?;
        let fml = force_multi_line(open.start, &list, close.start);
        Ok(Expr::Dict(DictExpr {
            comments: Comments::default(),
            start: open.start,
            list,
            comma,
            end: close.start,
            force_multi_line: fml,
        }))
    }

    fn parse_lambda(&mut self) -> Result<'a, Expr> {
        let lambda = self.bump();
        let mut params = Vec::new();
        if self.peek_kind() != TokenKind::Colon {
            params.push(self.parse_expr(PREC_ASSIGN)?);
            while self.peek_kind() == TokenKind::Comma {
                self.bump();
                if self.peek_kind() == TokenKind::Colon {
                    break;
                }
                params.push(self.parse_expr(PREC_ASSIGN)?);
            }
        }
        let colon = self.expect(TokenKind::Colon, "':' after lambda parameters")?;
        let body = self.parse_expr(PREC_ASSIGN)?;
        Ok(Expr::Lambda(LambdaExpr {
            comments: Comments::default(),
            lambda: lambda.start,
            params,
            colon: colon.start,
            body: Box::new(body),
        }))
    }

    // ------------------------------------------------------------------
    // Comprehensions
    // ------------------------------------------------------------------

    fn finish_comprehension(
        &mut self,
        brack: Bracket,
        open: Token<'a>,
        x: Expr,
    ) -> Result<'a, Expr> {
        let fml = open.start.line != x.span().0.line;
        let (for_clauses, if_clauses) = self.parse_comp_clauses()?;
        let (close_kind, expected) = match brack {
            Bracket::Square => (TokenKind::RBracket, "']' closing comprehension"),
            Bracket::Round => (TokenKind::RParen, "')' closing comprehension"),
            Bracket::Curly => (TokenKind::RBrace, "'}' closing comprehension"),
            Bracket::Bare => unreachable!("bare comprehensions are closed by the call"),
        };
        let close = self.expect(close_kind, expected)?;
        Ok(Expr::ListFor(ListForExpr {
            comments: Comments::default(),
            brack,
            start: open.start,
            x: Box::new(x),
            for_clauses,
            if_clauses,
            end: close.start,
            force_multi_line: fml,
        }))
    }

    fn parse_comp_clauses(&mut self) -> Result<'a, (Vec<ForClause>, Vec<IfClause>)> {
        let mut for_clauses = Vec::new();
        let mut if_clauses = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::For => {
                    let for_tok = self.bump();
                    let var = self.parse_for_vars()?;
                    let in_tok = self.expect(TokenKind::In, "'in' of for clause")?;
                    // The iterable stops short of `in` and of a bare `if`,
                    // which starts a filter clause rather than a ternary.
                    let x = self.parse_expr(PREC_OR)?;
                    for_clauses.push(ForClause {
                        comments: Comments::default(),
                        for_start: for_tok.start,
                        var,
                        in_start: in_tok.start,
                        x: Box::new(x),
                    });
                }
                TokenKind::If => {
                    let if_tok = self.bump();
                    let cond = self.parse_expr(PREC_TEST)?;
                    if_clauses.push(IfClause {
                        comments: Comments::default(),
                        if_start: if_tok.start,
                        cond: Box::new(cond),
                    });
                }
                _ => break,
            }
        }
        Ok((for_clauses, if_clauses))
    }

    /// Loop variables: one or more primaries, optionally parenthesized.
    /// The parenthesized form yields a flat variable list, never a tuple.
    fn parse_for_vars(&mut self) -> Result<'a, Vec<Expr>> {
        if self.peek_kind() == TokenKind::LParen {
            self.bump();
            let mut var = vec![self.parse_expr(PREC_POSTFIX)?];
            while self.peek_kind() == TokenKind::Comma {
                self.bump();
                if self.peek_kind() == TokenKind::RParen {
                    break;
                }
                var.push(self.parse_expr(PREC_POSTFIX)?);
            }
            self.expect(TokenKind::RParen, "')' closing loop variables")?;
            Ok(var)
        } else {
            let mut var = vec![self.parse_expr(PREC_POSTFIX)?];
            while self.peek_kind() == TokenKind::Comma {
                self.bump();
                var.push(self.parse_expr(PREC_POSTFIX)?);
            }
            Ok(var)
        }
    }
}
