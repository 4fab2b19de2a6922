//! Syntax tree for node expressions.

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Constant(Constant),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a and b and c` is kept flat.
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    /// Chained comparison `a < b <= c`.
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    /// `*value` in a call, display or subscript.
    Starred(Box<Expr>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    /// A `None` key stands for `**mapping` unpacking.
    Dict(Vec<(Option<Expr>, Expr)>),
    Comprehension {
        kind: CompKind,
        elt: Box<Expr>,
        generators: Vec<Generator>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Generator>,
    },
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },
    /// `(target := value)`
    NamedExpr {
        target: String,
        value: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Literal text as written.
    Number(String),
    /// Adjacent string literals, each as written.
    Str(Vec<String>),
    True,
    False,
    None,
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    MatMul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompKind {
    List,
    Set,
    Generator,
}

/// Keyword argument; `arg == None` is `**mapping`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

/// One `for target in iter if cond...` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub target: Target,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}

/// Assignment target of a comprehension clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Starred(Box<Target>),
    Tuple(Vec<Target>),
    /// Parenthesised or bracketed target list; printed with brackets.
    List(Vec<Target>),
}

impl Target {
    /// Names bound by this target, in textual order.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Target::Name(name) => out.push(name),
            Target::Starred(inner) => inner.collect(out),
            Target::Tuple(items) | Target::List(items) => {
                for item in items {
                    item.collect(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Normal,
    VarArgs,
    KwArgs,
    /// Bare `*` separating keyword-only parameters.
    KwOnlyMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_target_names_in_order() {
        let target = Target::Tuple(vec![
            Target::Name("a".into()),
            Target::List(vec![
                Target::Name("b".into()),
                Target::Starred(Box::new(Target::Name("c".into()))),
            ]),
        ]);
        assert_eq!(target.names(), vec!["a", "b", "c"]);
    }
}
