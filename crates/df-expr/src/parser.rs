//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Precedence, loosest first: named expression, lambda / conditional, `or`,
//! `and`, `not`, comparisons, `|`, `^`, `&`, shifts, `+ -`, `* / // % @`,
//! unary `+ - ~`, `**`, then calls / subscripts / attributes on atoms.

use crate::ast::{
    BinOp, BoolOp, CmpOp, CompKind, Constant, Expr, Generator, Keyword as KwArg, Param,
    ParamKind, Target, UnaryOp,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Keyword, Op, Token, TokenKind, tokenize};

/// Deepest nesting of brackets, unary operators, calls, subscripts and
/// operator chains a single expression may use.
pub const MAX_NESTING: usize = 100;

/// Parse a complete expression. Empty input and nesting deeper than
/// [`MAX_NESTING`] are errors.
pub fn parse(source: &str) -> ParseResult<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    if parser.at_eof() {
        return Err(ParseError::new("empty expression", 0));
    }
    let expr = parser.expression_list()?;
    if !parser.at_eof() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // `tokenize` always terminates the stream with `Eof`.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn kind_at(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn at_op(&self, op: Op) -> bool {
        matches!(self.kind(), TokenKind::Op(o) if *o == op)
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        matches!(self.kind(), TokenKind::Keyword(k) if *k == kw)
    }

    fn eat_op(&mut self, op: Op) -> bool {
        if self.at_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.at_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: Op, what: &str) -> ParseResult<()> {
        if self.eat_op(op) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expect_kw(&mut self, kw: Keyword, what: &str) -> ParseResult<()> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        match self.kind() {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected a name")),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current().offset)
    }

    /// Count one level of nesting. Errors abort the parse, so the level is
    /// only released on success.
    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("expression is nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.descend()?;
        let out = f(self)?;
        self.depth -= 1;
        Ok(out)
    }

    fn unexpected(&self) -> ParseError {
        let message = match self.kind() {
            TokenKind::Eof => "unexpected end of expression".to_string(),
            TokenKind::Name(n) => format!("unexpected name {n:?}"),
            TokenKind::Number(n) => format!("unexpected number {n}"),
            TokenKind::Str(_) => "unexpected string".to_string(),
            TokenKind::Keyword(k) => format!("unexpected keyword {k:?}"),
            TokenKind::Op(op) => format!("unexpected token {op:?}"),
        };
        self.error(message)
    }

    /// Tokens that end an element list.
    fn at_closer(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Eof
                | TokenKind::Op(Op::RParen | Op::RBracket | Op::RBrace | Op::Colon | Op::Assign)
                | TokenKind::Keyword(Keyword::For | Keyword::In)
        )
    }

    /// `elem ("," elem)* [","]` at the top level; a comma makes a tuple.
    fn expression_list(&mut self) -> ParseResult<Expr> {
        let first = self.star_or_named()?;
        if !self.at_op(Op::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_op(Op::Comma) {
            if self.at_closer() {
                break;
            }
            items.push(self.star_or_named()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn star_or_named(&mut self) -> ParseResult<Expr> {
        if self.eat_op(Op::Star) {
            let value = self.bitor()?;
            return Ok(Expr::Starred(Box::new(value)));
        }
        self.named()
    }

    /// `NAME := test | test`
    fn named(&mut self) -> ParseResult<Expr> {
        if let (TokenKind::Name(name), TokenKind::Op(Op::Walrus)) = (self.kind(), self.kind_at(1))
        {
            let target = name.clone();
            self.advance();
            self.advance();
            let value = self.test()?;
            return Ok(Expr::NamedExpr {
                target,
                value: Box::new(value),
            });
        }
        self.test()
    }

    /// `lambda | or_test ["if" or_test "else" test]`
    fn test(&mut self) -> ParseResult<Expr> {
        if self.at_kw(Keyword::Lambda) {
            return self.nested(Self::lambda);
        }
        let body = self.or_test()?;
        if !self.eat_kw(Keyword::If) {
            return Ok(body);
        }
        let test = self.or_test()?;
        self.expect_kw(Keyword::Else, "'else' in conditional expression")?;
        let orelse = self.nested(Self::test)?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    fn lambda(&mut self) -> ParseResult<Expr> {
        self.expect_kw(Keyword::Lambda, "'lambda'")?;
        let mut params: Vec<Param> = Vec::new();
        let mut seen_default = false;
        while !self.at_op(Op::Colon) {
            let start = self.current().offset;
            let param = if self.eat_op(Op::DoubleStar) {
                Param {
                    name: self.expect_name()?,
                    kind: ParamKind::KwArgs,
                    default: None,
                }
            } else if self.eat_op(Op::Star) {
                match self.kind() {
                    TokenKind::Name(_) => Param {
                        name: self.expect_name()?,
                        kind: ParamKind::VarArgs,
                        default: None,
                    },
                    _ => Param {
                        name: String::new(),
                        kind: ParamKind::KwOnlyMarker,
                        default: None,
                    },
                }
            } else {
                let name = self.expect_name()?;
                let default = if self.eat_op(Op::Assign) {
                    seen_default = true;
                    Some(self.test()?)
                } else if seen_default
                    && !params
                        .iter()
                        .any(|p| matches!(p.kind, ParamKind::VarArgs | ParamKind::KwOnlyMarker))
                {
                    return Err(ParseError::new(
                        "non-default argument follows default argument",
                        start,
                    ));
                } else {
                    None
                };
                Param {
                    name,
                    kind: ParamKind::Normal,
                    default,
                }
            };
            if param.kind != ParamKind::KwOnlyMarker
                && params.iter().any(|p| p.name == param.name)
            {
                return Err(ParseError::new(
                    format!("duplicate argument {:?} in lambda", param.name),
                    start,
                ));
            }
            params.push(param);
            if !self.eat_op(Op::Comma) {
                break;
            }
        }
        self.expect_op(Op::Colon, "':' after lambda parameters")?;
        let body = self.test()?;
        Ok(Expr::Lambda {
            params,
            body: Box::new(body),
        })
    }

    fn or_test(&mut self) -> ParseResult<Expr> {
        let first = self.and_test()?;
        if !self.at_kw(Keyword::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(Keyword::Or) {
            values.push(self.and_test()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::Or,
            values,
        })
    }

    fn and_test(&mut self) -> ParseResult<Expr> {
        let first = self.not_test()?;
        if !self.at_kw(Keyword::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(Keyword::And) {
            values.push(self.not_test()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::And,
            values,
        })
    }

    fn not_test(&mut self) -> ParseResult<Expr> {
        if self.eat_kw(Keyword::Not) {
            let operand = self.nested(Self::not_test)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.kind() {
            TokenKind::Op(Op::EqEq) => CmpOp::Eq,
            TokenKind::Op(Op::NotEq) => CmpOp::NotEq,
            TokenKind::Op(Op::Lt) => CmpOp::Lt,
            TokenKind::Op(Op::Le) => CmpOp::LtE,
            TokenKind::Op(Op::Gt) => CmpOp::Gt,
            TokenKind::Op(Op::Ge) => CmpOp::GtE,
            TokenKind::Keyword(Keyword::In) => CmpOp::In,
            TokenKind::Keyword(Keyword::Is) => {
                if matches!(self.kind_at(1), TokenKind::Keyword(Keyword::Not)) {
                    self.advance();
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            }
            TokenKind::Keyword(Keyword::Not)
                if matches!(self.kind_at(1), TokenKind::Keyword(Keyword::In)) =>
            {
                self.advance();
                CmpOp::NotIn
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let left = self.bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.comparison_op() {
            ops.push(op);
            comparators.push(self.bitor()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::Compare {
            left: Box::new(left),
            ops,
            comparators,
        })
    }

    /// Binary operator at the cursor with its binding level, `|` loosest.
    fn binary_op(&self) -> Option<(BinOp, u8)> {
        let TokenKind::Op(op) = self.kind() else {
            return None;
        };
        Some(match op {
            Op::Pipe => (BinOp::BitOr, 0),
            Op::Caret => (BinOp::BitXor, 1),
            Op::Amp => (BinOp::BitAnd, 2),
            Op::LShift => (BinOp::LShift, 3),
            Op::RShift => (BinOp::RShift, 3),
            Op::Plus => (BinOp::Add, 4),
            Op::Minus => (BinOp::Sub, 4),
            Op::Star => (BinOp::Mul, 5),
            Op::Slash => (BinOp::Div, 5),
            Op::DoubleSlash => (BinOp::FloorDiv, 5),
            Op::Percent => (BinOp::Mod, 5),
            Op::At => (BinOp::MatMul, 5),
            _ => return None,
        })
    }

    fn bitor(&mut self) -> ParseResult<Expr> {
        self.binary(0)
    }

    /// Left-associative operators binding at least as tight as `min`.
    fn binary(&mut self, min: u8) -> ParseResult<Expr> {
        let depth = self.depth;
        let mut left = self.factor()?;
        while let Some((op, level)) = self.binary_op().filter(|&(_, level)| level >= min) {
            self.advance();
            self.descend()?;
            let right = self.binary(level + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let op = match self.kind() {
            TokenKind::Op(Op::Plus) => UnaryOp::Plus,
            TokenKind::Op(Op::Minus) => UnaryOp::Minus,
            TokenKind::Op(Op::Tilde) => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.nested(Self::factor)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> ParseResult<Expr> {
        let base = self.primary()?;
        if !self.eat_op(Op::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.nested(Self::factor)?;
        Ok(Expr::Binary {
            op: BinOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let depth = self.depth;
        let mut expr = self.atom()?;
        loop {
            if matches!(self.kind(), TokenKind::Op(Op::Dot | Op::LParen | Op::LBracket)) {
                self.descend()?;
            }
            if self.eat_op(Op::Dot) {
                let attr = self.expect_name()?;
                expr = Expr::Attribute {
                    value: Box::new(expr),
                    attr,
                };
            } else if self.eat_op(Op::LParen) {
                expr = self.call(expr)?;
            } else if self.eat_op(Op::LBracket) {
                let index = self.subscript()?;
                self.expect_op(Op::RBracket, "']'")?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                self.depth = depth;
                return Ok(expr);
            }
        }
    }

    fn call(&mut self, func: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.at_op(Op::RParen) {
            if self.eat_op(Op::DoubleStar) {
                let value = self.test()?;
                keywords.push(KwArg { arg: None, value });
            } else if self.eat_op(Op::Star) {
                let value = self.test()?;
                args.push(Expr::Starred(Box::new(value)));
            } else if let (TokenKind::Name(name), TokenKind::Op(Op::Assign)) =
                (self.kind(), self.kind_at(1))
            {
                let arg = name.clone();
                self.advance();
                self.advance();
                let value = self.test()?;
                keywords.push(KwArg {
                    arg: Some(arg),
                    value,
                });
            } else {
                let start = self.current().offset;
                let value = self.named()?;
                if self.at_kw(Keyword::For) {
                    let generators = self.generators()?;
                    if !args.is_empty() || !keywords.is_empty() || !self.at_op(Op::RParen) {
                        return Err(ParseError::new(
                            "generator expression must be parenthesized",
                            start,
                        ));
                    }
                    args.push(Expr::Comprehension {
                        kind: CompKind::Generator,
                        elt: Box::new(value),
                        generators,
                    });
                    break;
                }
                if !keywords.is_empty() {
                    return Err(ParseError::new(
                        "positional argument follows keyword argument",
                        start,
                    ));
                }
                args.push(value);
            }
            if !self.eat_op(Op::Comma) {
                break;
            }
        }
        self.expect_op(Op::RParen, "')' to close call")?;
        Ok(Expr::Call {
            func: Box::new(func),
            args,
            keywords,
        })
    }

    fn subscript(&mut self) -> ParseResult<Expr> {
        let first = self.slice_item()?;
        if !self.at_op(Op::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_op(Op::Comma) {
            if self.at_op(Op::RBracket) {
                break;
            }
            items.push(self.slice_item()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn slice_item(&mut self) -> ParseResult<Expr> {
        if self.at_op(Op::Star) {
            return self.star_or_named();
        }
        let lower = if self.at_op(Op::Colon) {
            None
        } else {
            let value = self.named()?;
            if !self.at_op(Op::Colon) {
                return Ok(value);
            }
            Some(Box::new(value))
        };
        self.expect_op(Op::Colon, "':' in slice")?;
        let upper = if self.at_op(Op::Colon) || self.at_op(Op::Comma) || self.at_op(Op::RBracket)
        {
            None
        } else {
            Some(Box::new(self.test()?))
        };
        let step = if self.eat_op(Op::Colon) {
            if self.at_op(Op::Comma) || self.at_op(Op::RBracket) {
                None
            } else {
                Some(Box::new(self.test()?))
            }
        } else {
            None
        };
        Ok(Expr::Slice { lower, upper, step })
    }

    fn atom(&mut self) -> ParseResult<Expr> {
        let expr = match self.kind().clone() {
            TokenKind::Name(name) => {
                self.advance();
                Expr::Name(name)
            }
            TokenKind::Number(text) => {
                self.advance();
                Expr::Constant(Constant::Number(text))
            }
            TokenKind::Str(_) => {
                let mut parts = Vec::new();
                while let TokenKind::Str(text) = self.kind() {
                    parts.push(text.clone());
                    self.advance();
                }
                Expr::Constant(Constant::Str(parts))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Expr::Constant(Constant::True)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Expr::Constant(Constant::False)
            }
            TokenKind::Keyword(Keyword::None) => {
                self.advance();
                Expr::Constant(Constant::None)
            }
            TokenKind::Op(Op::Ellipsis) => {
                self.advance();
                Expr::Constant(Constant::Ellipsis)
            }
            TokenKind::Op(Op::LParen) => {
                self.advance();
                self.nested(Self::paren)?
            }
            TokenKind::Op(Op::LBracket) => {
                self.advance();
                self.nested(Self::bracket)?
            }
            TokenKind::Op(Op::LBrace) => {
                self.advance();
                self.nested(Self::brace)?
            }
            _ => return Err(self.unexpected()),
        };
        Ok(expr)
    }

    /// Remaining comma-separated display items after `first`, up to `close`.
    fn display_items(&mut self, first: Expr, close: Op) -> ParseResult<Vec<Expr>> {
        let mut items = vec![first];
        while self.eat_op(Op::Comma) {
            if self.at_op(close) {
                break;
            }
            items.push(self.star_or_named()?);
        }
        Ok(items)
    }

    fn paren(&mut self) -> ParseResult<Expr> {
        if self.eat_op(Op::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        let first = self.star_or_named()?;
        if self.at_kw(Keyword::For) {
            let generators = self.generators()?;
            self.expect_op(Op::RParen, "')' to close generator expression")?;
            return Ok(Expr::Comprehension {
                kind: CompKind::Generator,
                elt: Box::new(first),
                generators,
            });
        }
        if self.eat_op(Op::RParen) {
            if matches!(first, Expr::Starred(_)) {
                return Err(self.error("cannot use starred expression here"));
            }
            return Ok(first);
        }
        let items = self.display_items(first, Op::RParen)?;
        self.expect_op(Op::RParen, "')'")?;
        Ok(Expr::Tuple(items))
    }

    fn bracket(&mut self) -> ParseResult<Expr> {
        if self.eat_op(Op::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.star_or_named()?;
        if self.at_kw(Keyword::For) {
            let generators = self.generators()?;
            self.expect_op(Op::RBracket, "']' to close list comprehension")?;
            return Ok(Expr::Comprehension {
                kind: CompKind::List,
                elt: Box::new(first),
                generators,
            });
        }
        let items = self.display_items(first, Op::RBracket)?;
        self.expect_op(Op::RBracket, "']'")?;
        Ok(Expr::List(items))
    }

    fn brace(&mut self) -> ParseResult<Expr> {
        if self.eat_op(Op::RBrace) {
            return Ok(Expr::Dict(Vec::new()));
        }
        if self.at_op(Op::DoubleStar) {
            return self.dict_rest(Vec::new());
        }
        let first = self.star_or_named()?;
        if self.eat_op(Op::Colon) {
            let value = self.test()?;
            if self.at_kw(Keyword::For) {
                let generators = self.generators()?;
                self.expect_op(Op::RBrace, "'}' to close dict comprehension")?;
                return Ok(Expr::DictComp {
                    key: Box::new(first),
                    value: Box::new(value),
                    generators,
                });
            }
            return self.dict_rest(vec![(Some(first), value)]);
        }
        if self.at_kw(Keyword::For) {
            let generators = self.generators()?;
            self.expect_op(Op::RBrace, "'}' to close set comprehension")?;
            return Ok(Expr::Comprehension {
                kind: CompKind::Set,
                elt: Box::new(first),
                generators,
            });
        }
        let items = self.display_items(first, Op::RBrace)?;
        self.expect_op(Op::RBrace, "'}'")?;
        Ok(Expr::Set(items))
    }

    /// Dict display entries after the ones already parsed.
    fn dict_rest(&mut self, mut entries: Vec<(Option<Expr>, Expr)>) -> ParseResult<Expr> {
        if !entries.is_empty() && !self.eat_op(Op::Comma) {
            self.expect_op(Op::RBrace, "'}'")?;
            return Ok(Expr::Dict(entries));
        }
        while !self.at_op(Op::RBrace) {
            if self.eat_op(Op::DoubleStar) {
                let value = self.bitor()?;
                entries.push((None, value));
            } else {
                let key = self.test()?;
                self.expect_op(Op::Colon, "':' in dict display")?;
                let value = self.test()?;
                entries.push((Some(key), value));
            }
            if !self.eat_op(Op::Comma) {
                break;
            }
        }
        self.expect_op(Op::RBrace, "'}'")?;
        Ok(Expr::Dict(entries))
    }

    fn generators(&mut self) -> ParseResult<Vec<Generator>> {
        let mut generators = Vec::new();
        while self.eat_kw(Keyword::For) {
            let target = self.target_list()?;
            self.expect_kw(Keyword::In, "'in' in comprehension")?;
            let iter = self.or_test()?;
            let mut ifs = Vec::new();
            while self.eat_kw(Keyword::If) {
                ifs.push(self.or_test()?);
            }
            generators.push(Generator { target, iter, ifs });
        }
        Ok(generators)
    }

    fn target_list(&mut self) -> ParseResult<Target> {
        let first = self.target()?;
        if !self.at_op(Op::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_op(Op::Comma) {
            if self.at_kw(Keyword::In) {
                break;
            }
            items.push(self.target()?);
        }
        Ok(Target::Tuple(items))
    }

    fn target(&mut self) -> ParseResult<Target> {
        if self.eat_op(Op::Star) {
            return Ok(Target::Starred(Box::new(self.nested(Self::target)?)));
        }
        if self.eat_op(Op::LParen) {
            let inner = self.nested(|p| p.nested_targets(Op::RParen))?;
            return Ok(match inner {
                (mut items, false) if items.len() == 1 => items.remove(0),
                (items, _) => Target::Tuple(items),
            });
        }
        if self.eat_op(Op::LBracket) {
            let (items, _) = self.nested(|p| p.nested_targets(Op::RBracket))?;
            return Ok(Target::List(items));
        }
        Ok(Target::Name(self.expect_name()?))
    }

    /// Targets up to `close`; the flag reports whether a comma was seen.
    fn nested_targets(&mut self, close: Op) -> ParseResult<(Vec<Target>, bool)> {
        let mut items = Vec::new();
        let mut comma = false;
        while !self.at_op(close) {
            items.push(self.target()?);
            if !self.eat_op(Op::Comma) {
                break;
            }
            comma = true;
        }
        self.expect_op(close, "closing bracket in target list")?;
        Ok((items, comma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    #[test]
    fn binary_precedence() {
        let expr = parse("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Add,
                left: Box::new(name("a")),
                right: Box::new(Expr::Binary {
                    op: BinOp::Mul,
                    left: Box::new(name("b")),
                    right: Box::new(name("c")),
                }),
            }
        );
    }

    #[test]
    fn same_level_operators_associate_left_across_levels() {
        let expr = parse("a - b - c * d | e").unwrap();
        let Expr::Binary { op: BinOp::BitOr, left, right } = expr else {
            panic!("expected bitwise or at the root");
        };
        assert_eq!(*right, name("e"));
        let Expr::Binary { op: BinOp::Sub, left: inner, right: product } = *left else {
            panic!("expected subtraction");
        };
        assert!(matches!(*inner, Expr::Binary { op: BinOp::Sub, .. }));
        assert!(matches!(*product, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn nesting_is_counted_per_branch() {
        let depth = MAX_NESTING - 1;
        let inner = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse(&format!("[{inner}, {inner}]")).is_ok());
        assert!(parse(&format!("[{inner}, [{inner}]]")).is_err());
    }

    #[test]
    fn power_is_right_associative_and_binds_unary_operand() {
        let expr = parse("-a ** b ** c").unwrap();
        let Expr::Unary { op: UnaryOp::Minus, operand } = expr else {
            panic!("expected unary minus");
        };
        let Expr::Binary { op: BinOp::Pow, right, .. } = *operand else {
            panic!("expected power");
        };
        assert!(matches!(*right, Expr::Binary { op: BinOp::Pow, .. }));
    }

    #[test]
    fn comparison_chain_with_compound_operators() {
        let expr = parse("a < b is not c not in d").unwrap();
        let Expr::Compare { ops, comparators, .. } = expr else {
            panic!("expected comparison");
        };
        assert_eq!(ops, vec![CmpOp::Lt, CmpOp::IsNot, CmpOp::NotIn]);
        assert_eq!(comparators.len(), 3);
    }

    #[test]
    fn top_level_comma_builds_tuple() {
        assert_eq!(parse("a, b,").unwrap(), Expr::Tuple(vec![name("a"), name("b")]));
        assert_eq!(parse("()").unwrap(), Expr::Tuple(vec![]));
        assert_eq!(parse("(a)").unwrap(), name("a"));
    }

    #[test]
    fn comprehension_forms() {
        assert!(matches!(
            parse("[x for x in y if x]").unwrap(),
            Expr::Comprehension { kind: CompKind::List, .. }
        ));
        assert!(matches!(
            parse("{x for x in y}").unwrap(),
            Expr::Comprehension { kind: CompKind::Set, .. }
        ));
        assert!(matches!(
            parse("(x for x in y)").unwrap(),
            Expr::Comprehension { kind: CompKind::Generator, .. }
        ));
        assert!(matches!(
            parse("{k: v for k, v in items}").unwrap(),
            Expr::DictComp { .. }
        ));
        assert!(matches!(
            parse("sum(x for x in y)").unwrap(),
            Expr::Call { .. }
        ));
    }

    #[test]
    fn comprehension_target_tuple() {
        let Expr::Comprehension { generators, .. } = parse("[a for (a, b) in c]").unwrap() else {
            panic!("expected comprehension");
        };
        assert_eq!(generators[0].target.names(), vec!["a", "b"]);
    }

    #[test]
    fn dict_and_set_displays() {
        assert_eq!(parse("{}").unwrap(), Expr::Dict(vec![]));
        assert!(matches!(parse("{a: 1, **b}").unwrap(), Expr::Dict(e) if e.len() == 2));
        assert!(matches!(parse("{a, b}").unwrap(), Expr::Set(e) if e.len() == 2));
    }

    #[test]
    fn calls_with_keywords_and_unpacking() {
        let Expr::Call { args, keywords, .. } = parse("f(a, *b, k=c, **d)").unwrap() else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].arg.as_deref(), Some("k"));
        assert_eq!(keywords[1].arg, None);
    }

    #[test]
    fn slices() {
        let Expr::Subscript { index, .. } = parse("a[1:2, ::3]").unwrap() else {
            panic!("expected subscript");
        };
        let Expr::Tuple(items) = *index else {
            panic!("expected tuple index");
        };
        assert!(matches!(&items[0], Expr::Slice { lower: Some(_), upper: Some(_), step: None }));
        assert!(matches!(&items[1], Expr::Slice { lower: None, upper: None, step: Some(_) }));
    }

    #[test]
    fn lambda_and_conditional() {
        let Expr::Lambda { params, body } = parse("lambda x, y=1, *r, **k: x if y else r").unwrap()
        else {
            panic!("expected lambda");
        };
        let kinds: Vec<_> = params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![ParamKind::Normal, ParamKind::Normal, ParamKind::VarArgs, ParamKind::KwArgs]
        );
        assert!(matches!(*body, Expr::IfExp { .. }));
    }

    #[test]
    fn named_expression() {
        assert!(matches!(
            parse("(y := x + 1)").unwrap(),
            Expr::NamedExpr { target, .. } if target == "y"
        ));
    }

    #[test]
    fn adjacent_strings_concatenate() {
        assert_eq!(
            parse("'a' \"b\"").unwrap(),
            Expr::Constant(Constant::Str(vec!["'a'".into(), "\"b\"".into()]))
        );
    }

    #[test]
    fn syntax_errors() {
        for bad in ["", "   ", "a +", "(a", "a b", "f(x=1, y)", "lambda x, x: 1", "x if y", "[1,,2]", "yield x"]
        {
            assert!(parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn error_offset_points_at_problem() {
        let err = parse("a + )").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
