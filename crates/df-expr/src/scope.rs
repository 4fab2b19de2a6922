//! Scope resolution: which name reads refer to values from outside the expression.
//!
//! Three kinds of binding exist:
//! - comprehension targets, local to their comprehension (the first iterable
//!   is still evaluated in the enclosing scope);
//! - lambda parameters and named-expression targets inside a lambda body,
//!   local to that lambda (parameter defaults are evaluated outside);
//! - named-expression targets anywhere else, which write to the top level.
//!
//! A read is *free* when no enclosing local scope binds it and the top level
//! never writes it. The walk visits children in field order, which is textual
//! order except that a conditional visits its test first and a dict display
//! visits all keys before any value.

use std::collections::HashSet;

use crate::ast::{Expr, Generator, ParamKind};

/// Visit every free name read in `expr`, in field order.
///
/// The callback gets mutable access so the same walk serves renaming.
pub fn visit_free_reads<F>(expr: &mut Expr, mut f: F)
where
    F: FnMut(&mut String),
{
    let mut written = HashSet::new();
    collect_walrus_targets(expr, &mut written);
    let mut walker = Walker {
        frames: Vec::new(),
        written,
        f: &mut f,
    };
    walker.visit(expr);
}

/// Named-expression targets in `expr`, not descending into lambdas.
fn collect_walrus_targets(expr: &Expr, out: &mut HashSet<String>) {
    match expr {
        Expr::NamedExpr { target, value } => {
            out.insert(target.clone());
            collect_walrus_targets(value, out);
        }
        Expr::Lambda { params, .. } => {
            for default in params.iter().filter_map(|p| p.default.as_ref()) {
                collect_walrus_targets(default, out);
            }
        }
        other => for_each_child(other, |child| collect_walrus_targets(child, out)),
    }
}

/// Direct sub-expressions in field order.
fn for_each_child<'a>(expr: &'a Expr, mut f: impl FnMut(&'a Expr)) {
    match expr {
        Expr::Name(_) | Expr::Constant(_) => {}
        Expr::Unary { operand, .. } => f(operand),
        Expr::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        Expr::BoolOp { values, .. } => values.iter().for_each(f),
        Expr::Compare {
            left, comparators, ..
        } => {
            f(left);
            comparators.iter().for_each(f);
        }
        Expr::IfExp { test, body, orelse } => {
            f(test);
            f(body);
            f(orelse);
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            f(func);
            args.iter().for_each(&mut f);
            keywords.iter().for_each(|k| f(&k.value));
        }
        Expr::Attribute { value, .. } => f(value),
        Expr::Subscript { value, index } => {
            f(value);
            f(index);
        }
        Expr::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                f(part);
            }
        }
        Expr::Starred(inner) => f(inner),
        Expr::Tuple(items) | Expr::List(items) | Expr::Set(items) => items.iter().for_each(f),
        Expr::Dict(entries) => {
            entries.iter().filter_map(|(key, _)| key.as_ref()).for_each(&mut f);
            entries.iter().for_each(|(_, value)| f(value));
        }
        Expr::Comprehension {
            elt, generators, ..
        } => {
            f(elt);
            generators_children(generators, &mut f);
        }
        Expr::DictComp {
            key,
            value,
            generators,
        } => {
            f(key);
            f(value);
            generators_children(generators, &mut f);
        }
        Expr::Lambda { params, body } => {
            for default in params.iter().filter_map(|p| p.default.as_ref()) {
                f(default);
            }
            f(body);
        }
        Expr::NamedExpr { value, .. } => f(value),
    }
}

fn generators_children<'a>(generators: &'a [Generator], f: &mut impl FnMut(&'a Expr)) {
    for generator in generators {
        f(&generator.iter);
        generator.ifs.iter().for_each(&mut *f);
    }
}

struct Walker<'f, F> {
    frames: Vec<HashSet<String>>,
    written: HashSet<String>,
    f: &'f mut F,
}

impl<F> Walker<'_, F>
where
    F: FnMut(&mut String),
{
    fn is_local(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }

    fn visit_all(&mut self, items: &mut [Expr]) {
        for item in items {
            self.visit(item);
        }
    }

    fn visit(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Name(name) => {
                if !self.is_local(name) && !self.written.contains(name.as_str()) {
                    (self.f)(name);
                }
            }
            Expr::Constant(_) => {}
            Expr::Unary { operand, .. } => self.visit(operand),
            Expr::Binary { left, right, .. } => {
                self.visit(left);
                self.visit(right);
            }
            Expr::BoolOp { values, .. } => self.visit_all(values),
            Expr::Compare {
                left, comparators, ..
            } => {
                self.visit(left);
                self.visit_all(comparators);
            }
            Expr::IfExp { test, body, orelse } => {
                self.visit(test);
                self.visit(body);
                self.visit(orelse);
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                self.visit(func);
                self.visit_all(args);
                for keyword in keywords {
                    self.visit(&mut keyword.value);
                }
            }
            Expr::Attribute { value, .. } => self.visit(value),
            Expr::Subscript { value, index } => {
                self.visit(value);
                self.visit(index);
            }
            Expr::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.visit(part);
                }
            }
            Expr::Starred(inner) => self.visit(inner),
            Expr::Tuple(items) | Expr::List(items) | Expr::Set(items) => self.visit_all(items),
            Expr::Dict(entries) => {
                for key in entries.iter_mut().filter_map(|(key, _)| key.as_mut()) {
                    self.visit(key);
                }
                for (_, value) in entries.iter_mut() {
                    self.visit(value);
                }
            }
            Expr::Comprehension {
                elt, generators, ..
            } => {
                let frame = comprehension_frame(generators);
                self.frames.push(frame.clone());
                self.visit(elt);
                self.frames.pop();
                self.visit_generators(generators, frame);
            }
            Expr::DictComp {
                key,
                value,
                generators,
            } => {
                let frame = comprehension_frame(generators);
                self.frames.push(frame.clone());
                self.visit(key);
                self.visit(value);
                self.frames.pop();
                self.visit_generators(generators, frame);
            }
            Expr::Lambda { params, body } => {
                for default in params.iter_mut().filter_map(|p| p.default.as_mut()) {
                    self.visit(default);
                }
                let mut frame: HashSet<String> = params
                    .iter()
                    .filter(|p| p.kind != ParamKind::KwOnlyMarker)
                    .map(|p| p.name.clone())
                    .collect();
                collect_walrus_targets(body, &mut frame);
                self.frames.push(frame);
                self.visit(body);
                self.frames.pop();
            }
            Expr::NamedExpr { value, .. } => self.visit(value),
        }
    }

    /// The first iterable sees the enclosing scope; the rest see `frame`.
    fn visit_generators(&mut self, generators: &mut [Generator], mut frame: HashSet<String>) {
        for (i, generator) in generators.iter_mut().enumerate() {
            self.visit(&mut generator.iter);
            if i == 0 {
                self.frames.push(std::mem::take(&mut frame));
            }
            self.visit_all(&mut generator.ifs);
        }
        if !generators.is_empty() {
            self.frames.pop();
        }
    }
}

fn comprehension_frame(generators: &[Generator]) -> HashSet<String> {
    generators
        .iter()
        .flat_map(|g| g.target.names())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn free(src: &str) -> Vec<String> {
        let mut tree = parse(src).unwrap();
        let mut out: Vec<String> = Vec::new();
        visit_free_reads(&mut tree, |name| {
            if !out.contains(name) {
                out.push(name.clone());
            }
        });
        out
    }

    #[test]
    fn comprehension_targets_are_local() {
        assert_eq!(free("[x * a for x in xs]"), vec!["a", "xs"]);
        assert_eq!(free("{k: v for k, v in d.items() if k != skip}"), vec!["d", "skip"]);
    }

    #[test]
    fn first_iterable_sees_enclosing_scope() {
        assert_eq!(free("[x for x in x]"), vec!["x"]);
        assert_eq!(free("[y for x in xs for y in x]"), vec!["xs"]);
    }

    #[test]
    fn lambda_parameters_are_local_but_defaults_are_not() {
        assert_eq!(free("lambda x, y=y0: x + y + z"), vec!["y0", "z"]);
        assert_eq!(free("lambda *args, **kw: f(*args, **kw)"), vec!["f"]);
    }

    #[test]
    fn walrus_target_is_a_write() {
        assert_eq!(free("(y := x + 1) * y"), vec!["x"]);
        assert_eq!(free("[(t := v) for v in vs] + [t]"), vec!["vs"]);
        assert_eq!(free("z + (z := 2)"), Vec::<String>::new());
    }

    #[test]
    fn walrus_inside_lambda_stays_local() {
        assert_eq!(free("(lambda: (w := 1) + w)() + w"), vec!["w"]);
        assert_eq!(free("(lambda: (w := 1))() or w"), vec!["w"]);
    }

    #[test]
    fn conditional_visits_test_before_branches() {
        assert_eq!(free("a if c else b"), vec!["c", "a", "b"]);
    }

    #[test]
    fn dict_keys_come_before_values() {
        assert_eq!(free("{a: b, c: d}"), vec!["a", "c", "b", "d"]);
        assert_eq!(free("{a: b, **m, c: d}"), vec!["a", "c", "b", "m", "d"]);
    }

    #[test]
    fn attributes_and_keywords_are_not_names() {
        assert_eq!(free("math.sqrt(x, base=b)"), vec!["math", "x", "b"]);
    }
}
