//! Canonical printing of expression trees.
//!
//! Output uses single spaces around binary operators and the fewest
//! parentheses the precedence rules allow. Tuples and named expressions are
//! always parenthesized.

use std::fmt;

use crate::ast::{
    BinOp, BoolOp, CmpOp, CompKind, Constant, Expr, Generator, Param, ParamKind, Target,
    UnaryOp,
};

const TEST: u8 = 2;
const OR: u8 = 3;
const AND: u8 = 4;
const NOT: u8 = 5;
const CMP: u8 = 6;
const BIT_OR: u8 = 7;
const BIT_XOR: u8 = 8;
const BIT_AND: u8 = 9;
const SHIFT: u8 = 10;
const ARITH: u8 = 11;
const TERM: u8 = 12;
const FACTOR: u8 = 13;
const POWER: u8 = 14;
const PRIMARY: u8 = 15;
const ATOM: u8 = 16;

/// Print `expr` in canonical form.
pub fn unparse(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr, TEST);
    printer.out
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&unparse(self))
    }
}

fn binop_info(op: BinOp) -> (&'static str, u8) {
    match op {
        BinOp::Add => ("+", ARITH),
        BinOp::Sub => ("-", ARITH),
        BinOp::Mul => ("*", TERM),
        BinOp::MatMul => ("@", TERM),
        BinOp::Div => ("/", TERM),
        BinOp::FloorDiv => ("//", TERM),
        BinOp::Mod => ("%", TERM),
        BinOp::Pow => ("**", POWER),
        BinOp::LShift => ("<<", SHIFT),
        BinOp::RShift => (">>", SHIFT),
        BinOp::BitOr => ("|", BIT_OR),
        BinOp::BitXor => ("^", BIT_XOR),
        BinOp::BitAnd => ("&", BIT_AND),
    }
}

fn cmp_text(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::NotEq => "!=",
        CmpOp::Lt => "<",
        CmpOp::LtE => "<=",
        CmpOp::Gt => ">",
        CmpOp::GtE => ">=",
        CmpOp::Is => "is",
        CmpOp::IsNot => "is not",
        CmpOp::In => "in",
        CmpOp::NotIn => "not in",
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Lambda { .. } | Expr::IfExp { .. } => TEST,
        Expr::BoolOp { op: BoolOp::Or, .. } => OR,
        Expr::BoolOp { op: BoolOp::And, .. } => AND,
        Expr::Unary { op: UnaryOp::Not, .. } => NOT,
        Expr::Unary { .. } => FACTOR,
        Expr::Compare { .. } => CMP,
        Expr::Binary { op, .. } => binop_info(*op).1,
        Expr::Call { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => PRIMARY,
        _ => ATOM,
    }
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn comma_separated<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            each(self, item);
        }
    }

    fn expr(&mut self, expr: &Expr, ctx: u8) {
        let wrap = precedence(expr) < ctx;
        if wrap {
            self.push("(");
        }
        self.expr_inner(expr);
        if wrap {
            self.push(")");
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => self.push(name),
            Expr::Constant(constant) => self.constant(constant),
            Expr::Unary { op, operand } => {
                let (text, prec) = match op {
                    UnaryOp::Not => ("not ", NOT),
                    UnaryOp::Plus => ("+", FACTOR),
                    UnaryOp::Minus => ("-", FACTOR),
                    UnaryOp::Invert => ("~", FACTOR),
                };
                self.push(text);
                self.expr(operand, prec);
            }
            Expr::Binary { op, left, right } => {
                let (text, prec) = binop_info(*op);
                let (left_ctx, right_ctx) = if *op == BinOp::Pow {
                    (PRIMARY, FACTOR)
                } else {
                    (prec, prec + 1)
                };
                self.expr(left, left_ctx);
                self.push(" ");
                self.push(text);
                self.push(" ");
                self.expr(right, right_ctx);
            }
            Expr::BoolOp { op, values } => {
                let (text, prec) = match op {
                    BoolOp::And => (" and ", AND),
                    BoolOp::Or => (" or ", OR),
                };
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(text);
                    }
                    self.expr(value, prec + 1);
                }
            }
            Expr::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expr(left, CMP + 1);
                for (op, right) in ops.iter().zip(comparators) {
                    self.push(" ");
                    self.push(cmp_text(*op));
                    self.push(" ");
                    self.expr(right, CMP + 1);
                }
            }
            Expr::IfExp { test, body, orelse } => {
                self.expr(body, TEST + 1);
                self.push(" if ");
                self.expr(test, TEST + 1);
                self.push(" else ");
                self.expr(orelse, TEST);
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                self.expr(func, PRIMARY);
                if let [
                    arg @ Expr::Comprehension {
                        kind: CompKind::Generator,
                        ..
                    },
                ] = args.as_slice()
                    && keywords.is_empty()
                {
                    self.expr(arg, TEST);
                    return;
                }
                self.push("(");
                self.comma_separated(args, |p, arg| p.expr(arg, TEST));
                if !args.is_empty() && !keywords.is_empty() {
                    self.push(", ");
                }
                self.comma_separated(keywords, |p, keyword| {
                    match &keyword.arg {
                        Some(name) => {
                            p.push(name);
                            p.push("=");
                        }
                        None => p.push("**"),
                    }
                    p.expr(&keyword.value, TEST);
                });
                self.push(")");
            }
            Expr::Attribute { value, attr } => {
                self.expr(value, PRIMARY);
                // `1.real` would lex as a float.
                if let Expr::Constant(Constant::Number(text)) = value.as_ref()
                    && text.chars().all(|c| c.is_ascii_digit() || c == '_')
                {
                    self.push(" ");
                }
                self.push(".");
                self.push(attr);
            }
            Expr::Subscript { value, index } => {
                self.expr(value, PRIMARY);
                self.push("[");
                match index.as_ref() {
                    Expr::Tuple(items) if !items.is_empty() => {
                        self.comma_separated(items, |p, item| p.expr(item, TEST));
                        if items.len() == 1 {
                            self.push(",");
                        }
                    }
                    other => self.expr(other, TEST),
                }
                self.push("]");
            }
            Expr::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(lower, TEST);
                }
                self.push(":");
                if let Some(upper) = upper {
                    self.expr(upper, TEST);
                }
                if let Some(step) = step {
                    self.push(":");
                    self.expr(step, TEST);
                }
            }
            Expr::Starred(inner) => {
                self.push("*");
                self.expr(inner, BIT_OR);
            }
            Expr::Tuple(items) => {
                self.push("(");
                self.comma_separated(items, |p, item| p.expr(item, TEST));
                if items.len() == 1 {
                    self.push(",");
                }
                self.push(")");
            }
            Expr::List(items) => {
                self.push("[");
                self.comma_separated(items, |p, item| p.expr(item, TEST));
                self.push("]");
            }
            Expr::Set(items) => {
                self.push("{");
                self.comma_separated(items, |p, item| p.expr(item, TEST));
                self.push("}");
            }
            Expr::Dict(entries) => {
                self.push("{");
                self.comma_separated(entries, |p, (key, value)| match key {
                    Some(key) => {
                        p.expr(key, TEST);
                        p.push(": ");
                        p.expr(value, TEST);
                    }
                    None => {
                        p.push("**");
                        p.expr(value, BIT_OR);
                    }
                });
                self.push("}");
            }
            Expr::Comprehension {
                kind,
                elt,
                generators,
            } => {
                let (open, close) = match kind {
                    CompKind::List => ("[", "]"),
                    CompKind::Set => ("{", "}"),
                    CompKind::Generator => ("(", ")"),
                };
                self.push(open);
                self.expr(elt, TEST);
                self.generators(generators);
                self.push(close);
            }
            Expr::DictComp {
                key,
                value,
                generators,
            } => {
                self.push("{");
                self.expr(key, TEST);
                self.push(": ");
                self.expr(value, TEST);
                self.generators(generators);
                self.push("}");
            }
            Expr::Lambda { params, body } => {
                self.push("lambda");
                if !params.is_empty() {
                    self.push(" ");
                    self.comma_separated(params, Self::param);
                }
                self.push(": ");
                self.expr(body, TEST);
            }
            Expr::NamedExpr { target, value } => {
                self.push("(");
                self.push(target);
                self.push(" := ");
                self.expr(value, TEST);
                self.push(")");
            }
        }
    }

    fn constant(&mut self, constant: &Constant) {
        match constant {
            Constant::Number(text) => self.push(text),
            Constant::Str(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        self.push(" ");
                    }
                    self.push(part);
                }
            }
            Constant::True => self.push("True"),
            Constant::False => self.push("False"),
            Constant::None => self.push("None"),
            Constant::Ellipsis => self.push("..."),
        }
    }

    fn param(&mut self, param: &Param) {
        match param.kind {
            ParamKind::Normal => {}
            ParamKind::VarArgs => self.push("*"),
            ParamKind::KwArgs => self.push("**"),
            ParamKind::KwOnlyMarker => {
                self.push("*");
                return;
            }
        }
        self.push(&param.name);
        if let Some(default) = &param.default {
            self.push("=");
            self.expr(default, TEST);
        }
    }

    fn generators(&mut self, generators: &[Generator]) {
        for generator in generators {
            self.push(" for ");
            self.target(&generator.target, false);
            self.push(" in ");
            self.expr(&generator.iter, TEST + 1);
            for cond in &generator.ifs {
                self.push(" if ");
                self.expr(cond, TEST + 1);
            }
        }
    }

    fn target(&mut self, target: &Target, nested: bool) {
        match target {
            Target::Name(name) => self.push(name),
            Target::Starred(inner) => {
                self.push("*");
                self.target(inner, true);
            }
            Target::Tuple(items) => {
                if nested {
                    self.push("(");
                }
                self.comma_separated(items, |p, item| p.target(item, true));
                if items.len() == 1 {
                    self.push(",");
                }
                if nested {
                    self.push(")");
                }
            }
            Target::List(items) => {
                self.push("[");
                self.comma_separated(items, |p, item| p.target(item, true));
                self.push("]");
            }
        }
    }
}
