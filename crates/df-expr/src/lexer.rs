//! Tokenizer for the expression language.

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name(String),
    Keyword(Keyword),
    /// Numeric literal, kept verbatim.
    Number(String),
    /// String literal including prefix and quotes, kept verbatim.
    Str(String),
    Op(Op),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    False,
    None,
    True,
    And,
    Else,
    For,
    If,
    In,
    Is,
    Lambda,
    Not,
    Or,
    /// Reserved words that can never start or continue an expression.
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Assign,
    Walrus,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    At,
    Pipe,
    Amp,
    Caret,
    Tilde,
    LShift,
    RShift,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

const RESERVED: &[&str] = &[
    "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "except", "finally", "from", "global", "import", "nonlocal", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

fn keyword(word: &str) -> Option<Keyword> {
    let kw = match word {
        "False" => Keyword::False,
        "None" => Keyword::None,
        "True" => Keyword::True,
        "and" => Keyword::And,
        "else" => Keyword::Else,
        "for" => Keyword::For,
        "if" => Keyword::If,
        "in" => Keyword::In,
        "is" => Keyword::Is,
        "lambda" => Keyword::Lambda,
        "not" => Keyword::Not,
        "or" => Keyword::Or,
        _ if RESERVED.contains(&word) => Keyword::Reserved,
        _ => return None,
    };
    Some(kw)
}

/// Split `source` into tokens, terminated by a single `Eof` token.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, offset: usize) {
        self.tokens.push(Token { kind, offset });
    }

    fn run(mut self) -> ParseResult<Vec<Token>> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                ' ' | '\t' | '\r' | '\n' | '\x0c' => {
                    self.bump();
                }
                '\\' if matches!(self.peek_at(1), Some('\n')) => {
                    self.pos += 2;
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '\'' | '"' => {
                    let text = self.string(start)?;
                    self.push(TokenKind::Str(text), start);
                }
                c if c.is_ascii_digit() => {
                    let text = self.number(start)?;
                    self.push(TokenKind::Number(text), start);
                }
                '.' if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                    let text = self.number(start)?;
                    self.push(TokenKind::Number(text), start);
                }
                c if c == '_' || c.is_alphabetic() => {
                    self.word(start)?;
                }
                _ => {
                    let op = self.operator(start)?;
                    self.push(TokenKind::Op(op), start);
                }
            }
        }
        let end = self.src.len();
        self.push(TokenKind::Eof, end);
        Ok(self.tokens)
    }

    fn word(&mut self, start: usize) -> ParseResult<()> {
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        let word = &self.src[start..self.pos];

        if matches!(self.peek(), Some('\'' | '"'))
            && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str())
        {
            let text = self.string(start)?;
            self.push(TokenKind::Str(text), start);
            return Ok(());
        }

        let kind = match keyword(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Name(word.to_string()),
        };
        self.push(kind, start);
        Ok(())
    }

    /// Consume a string literal whose prefix (if any) starts at `start`.
    fn string(&mut self, start: usize) -> ParseResult<String> {
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(ParseError::new("expected string quote", self.pos)),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2 * quote.len_utf8();
        }

        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(ParseError::new("unterminated string literal", start)),
            };
            match c {
                '\\' => {
                    if self.bump().is_none() {
                        return Err(ParseError::new("unterminated string literal", start));
                    }
                }
                '\n' if !triple => {
                    return Err(ParseError::new("unterminated string literal", start));
                }
                c if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.pos += 2 * quote.len_utf8();
                        break;
                    }
                }
                _ => {}
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn digits(&mut self, radix: u32) -> usize {
        let before = self.pos;
        while let Some(c) = self.peek() {
            if c == '_' || c.is_digit(radix) {
                self.bump();
            } else {
                break;
            }
        }
        self.pos - before
    }

    fn number(&mut self, start: usize) -> ParseResult<String> {
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                if self.digits(radix) == 0 {
                    return Err(ParseError::new("invalid integer literal", start));
                }
                return self.finish_number(start);
            }
        }

        self.digits(10);
        if self.peek() == Some('.') {
            self.bump();
            self.digits(10);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.digits(10) == 0 {
                self.pos = mark;
                return Err(ParseError::new("invalid float exponent", mark));
            }
        }
        if matches!(self.peek(), Some('j' | 'J')) {
            self.bump();
        }
        self.finish_number(start)
    }

    fn finish_number(&mut self, start: usize) -> ParseResult<String> {
        if matches!(self.peek(), Some(c) if c == '_' || c.is_alphanumeric()) {
            return Err(ParseError::new("invalid numeric literal", start));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn operator(&mut self, start: usize) -> ParseResult<Op> {
        let rest = &self.src[self.pos..];
        const OPS: &[(&str, Op)] = &[
            ("...", Op::Ellipsis),
            ("**", Op::DoubleStar),
            ("//", Op::DoubleSlash),
            ("<<", Op::LShift),
            (">>", Op::RShift),
            ("<=", Op::Le),
            (">=", Op::Ge),
            ("==", Op::EqEq),
            ("!=", Op::NotEq),
            (":=", Op::Walrus),
            ("(", Op::LParen),
            (")", Op::RParen),
            ("[", Op::LBracket),
            ("]", Op::RBracket),
            ("{", Op::LBrace),
            ("}", Op::RBrace),
            (",", Op::Comma),
            (":", Op::Colon),
            (".", Op::Dot),
            ("=", Op::Assign),
            ("+", Op::Plus),
            ("-", Op::Minus),
            ("*", Op::Star),
            ("/", Op::Slash),
            ("%", Op::Percent),
            ("@", Op::At),
            ("|", Op::Pipe),
            ("&", Op::Amp),
            ("^", Op::Caret),
            ("~", Op::Tilde),
            ("<", Op::Lt),
            (">", Op::Gt),
        ];
        for (text, op) in OPS {
            if rest.starts_with(text) {
                self.pos += text.len();
                return Ok(*op);
            }
        }
        let c = rest.chars().next().unwrap_or('?');
        Err(ParseError::new(format!("unexpected character {c:?}"), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn names_and_operators() {
        assert_eq!(
            kinds("a+b"),
            vec![
                TokenKind::Name("a".into()),
                TokenKind::Op(Op::Plus),
                TokenKind::Name("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("x**2 // y"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Op(Op::DoubleStar),
                TokenKind::Number("2".into()),
                TokenKind::Op(Op::DoubleSlash),
                TokenKind::Name("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(
            kinds("not x"),
            vec![
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Name("x".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("yield")[0], TokenKind::Keyword(Keyword::Reserved));
    }

    #[test]
    fn numbers_are_kept_verbatim() {
        assert_eq!(kinds("1_000")[0], TokenKind::Number("1_000".into()));
        assert_eq!(kinds("3.5e-2")[0], TokenKind::Number("3.5e-2".into()));
        assert_eq!(kinds(".5")[0], TokenKind::Number(".5".into()));
        assert_eq!(kinds("0xFF")[0], TokenKind::Number("0xFF".into()));
        assert!(tokenize("12abc").is_err());
    }

    #[test]
    fn strings_with_prefixes_and_escapes() {
        assert_eq!(kinds(r#""a\"b""#)[0], TokenKind::Str(r#""a\"b""#.into()));
        assert_eq!(kinds("f'{x}'")[0], TokenKind::Str("f'{x}'".into()));
        assert_eq!(kinds("'''a\nb'''")[0], TokenKind::Str("'''a\nb'''".into()));
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("x # trailing"),
            vec![TokenKind::Name("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn stray_character_is_an_error() {
        let err = tokenize("a $ b").unwrap_err();
        assert_eq!(err.offset, 2);
    }
}
