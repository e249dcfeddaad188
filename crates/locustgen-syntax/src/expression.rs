//! Expression nodes
//!
//! Expressions always render to a single line of text and never carry
//! comments: comments attach to the [`Statement`](crate::Statement) that
//! contains the expression.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

use crate::value::{str_repr, Value};

/// A Python expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value (`1`, `'a'`, `[1, {'b': x}]`, ...)
    Literal(Value),
    /// f-string; holds the template, e.g. `a{x}b` for `f'a{x}b'`
    FString(String),
    /// Bare name, rendered without quoting
    Symbol(Symbol),
    /// Function or method invocation
    Call(FunctionCall),
    /// Binary operator application
    BinaryOp(BinaryOp),
    /// Placeholder resolved at render time
    View(ExpressionView),
}

impl Expression {
    /// Literal expression
    #[inline]
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// f-string expression from its template
    #[inline]
    #[must_use]
    pub fn fstring(template: impl Into<String>) -> Self {
        Self::FString(template.into())
    }

    /// Bare name expression
    #[inline]
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Binary operation expression
    #[inline]
    #[must_use]
    pub fn binary(lhs: Expression, op: impl Into<String>, rhs: Expression) -> Self {
        Self::BinaryOp(BinaryOp::new(lhs, op, rhs))
    }

    /// Placeholder expression
    #[inline]
    #[must_use]
    pub fn view(key: ViewKey, name: impl Into<String>) -> Self {
        Self::View(ExpressionView::new(key, name))
    }

    /// Render this expression, resolving placeholders through `env`
    #[must_use]
    pub fn render(&self, env: &dyn Resolve) -> String {
        match self {
            Expression::Literal(value) => {
                let mut out = String::new();
                value.write_repr(&mut out, env);
                out
            }
            Expression::FString(template) => format!("f{}", str_repr(template)),
            Expression::Symbol(symbol) => symbol.name().to_string(),
            Expression::Call(call) => call.render(env),
            Expression::BinaryOp(op) => op.render(env),
            Expression::View(view) => view.render(env),
        }
    }

    /// Copy of this expression with every resolvable placeholder replaced by
    /// its current value
    #[must_use]
    pub fn resolved(&self, env: &dyn Resolve) -> Expression {
        match self {
            Expression::Literal(value) => Expression::Literal(value.resolved(env)),
            Expression::Call(call) => Expression::Call(FunctionCall {
                name: call.name.clone(),
                positional: call.positional.iter().map(|e| e.resolved(env)).collect(),
                named: call
                    .named
                    .iter()
                    .map(|(k, e)| (k.clone(), e.resolved(env)))
                    .collect(),
            }),
            Expression::BinaryOp(op) => Expression::BinaryOp(BinaryOp {
                lhs: Box::new(op.lhs.resolved(env)),
                op: op.op.clone(),
                rhs: Box::new(op.rhs.resolved(env)),
            }),
            Expression::View(view) => match env.resolve(view) {
                Some(expr) => expr.resolved(env),
                None => self.clone(),
            },
            Expression::FString(_) | Expression::Symbol(_) => self.clone(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&Unresolved))
    }
}

impl From<Symbol> for Expression {
    fn from(s: Symbol) -> Self {
        Expression::Symbol(s)
    }
}

impl From<FunctionCall> for Expression {
    fn from(c: FunctionCall) -> Self {
        Expression::Call(c)
    }
}

impl From<BinaryOp> for Expression {
    fn from(op: BinaryOp) -> Self {
        Expression::BinaryOp(op)
    }
}

impl From<ExpressionView> for Expression {
    fn from(v: ExpressionView) -> Self {
        Expression::View(v)
    }
}

/// The name of something (variable, function, ...)
///
/// Only text can name a symbol: `Symbol::new(true)` does not compile, so a
/// boolean is never silently turned into the name `True`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Invocation of a function or method
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Name of the called function, e.g. `self.client.get`
    pub name: String,
    /// Positional arguments
    pub positional: Vec<Expression>,
    /// Keyword arguments, rendered in insertion order
    pub named: IndexMap<String, Expression>,
}

impl FunctionCall {
    /// Call without arguments
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: IndexMap::new(),
        }
    }

    /// Add a positional argument
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Expression>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Add (or replace) a keyword argument
    #[inline]
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Expression>) -> Self {
        self.named.insert(name.into(), arg.into());
        self
    }

    fn render(&self, env: &dyn Resolve) -> String {
        let args: Vec<String> = self
            .positional
            .iter()
            .map(|a| a.render(env))
            .chain(self.named.iter().map(|(k, v)| format!("{k}={}", v.render(env))))
            .collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

/// Invocation of a binary operator
///
/// Operands that are themselves binary operations are always parenthesized,
/// even when precedence would not require it: `1 + (2 + 3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    /// Left-hand side operand
    pub lhs: Box<Expression>,
    /// Operator text, like `+`
    pub op: String,
    /// Right-hand side operand
    pub rhs: Box<Expression>,
}

impl BinaryOp {
    #[inline]
    #[must_use]
    pub fn new(lhs: Expression, op: impl Into<String>, rhs: Expression) -> Self {
        Self {
            lhs: Box::new(lhs),
            op: op.into(),
            rhs: Box::new(rhs),
        }
    }

    fn render(&self, env: &dyn Resolve) -> String {
        let operand = |e: &Expression| match e {
            Expression::BinaryOp(_) => format!("({})", e.render(env)),
            _ => e.render(env),
        };
        format!("{} {} {}", operand(&self.lhs), self.op, operand(&self.rhs))
    }
}

/// Index of a pending value in some external table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewKey(pub usize);

/// Placeholder for a value that is not an [`Expression`] yet
///
/// The view stores an index, not the value: whatever owns the table of
/// pending values converts the current entry into an expression each time
/// the view is rendered, so mutations of that entry made after the tree was
/// built still show up in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionView {
    /// Entry of the resolving table
    pub key: ViewKey,
    /// Purely descriptive label
    pub name: String,
}

impl ExpressionView {
    #[inline]
    #[must_use]
    pub fn new(key: ViewKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }

    fn render(&self, env: &dyn Resolve) -> String {
        match env.resolve(self) {
            Some(expr) => expr.render(env),
            None => "...".to_string(),
        }
    }
}

/// Table of pending values behind [`ExpressionView`] placeholders
pub trait Resolve {
    /// Current expression for `view`, or `None` if this table doesn't know it
    fn resolve(&self, view: &ExpressionView) -> Option<Expression>;
}

/// Resolver that knows no placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl Resolve for Unresolved {
    #[inline]
    fn resolve(&self, _view: &ExpressionView) -> Option<Expression> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn literal_vs_symbol() {
        assert_eq!(Expression::literal("x").to_string(), "'x'");
        assert_eq!(Expression::symbol("x").to_string(), "x");
    }

    #[test]
    fn fstring_adds_prefix() {
        assert_eq!(Expression::fstring("a{x}b").to_string(), "f'a{x}b'");
    }

    #[test]
    fn call_orders_positional_then_named() {
        let call = FunctionCall::new("f")
            .arg(Expression::literal(1))
            .kwarg("z", Expression::symbol("a"))
            .kwarg("b", Expression::literal(false));
        assert_eq!(Expression::from(call).to_string(), "f(1, z=a, b=False)");
    }

    #[test]
    fn call_without_args() {
        assert_eq!(Expression::from(FunctionCall::new("g")).to_string(), "g()");
    }

    #[test]
    fn nested_binary_ops_are_parenthesized() {
        let inner = Expression::binary(Expression::literal(1), "*", Expression::literal(2));
        let outer = Expression::binary(inner.clone(), "+", Expression::literal(3));
        assert_eq!(outer.to_string(), "(1 * 2) + 3");
        let right = Expression::binary(Expression::literal(1), "+", inner);
        assert_eq!(right.to_string(), "1 + (1 * 2)");
    }

    struct Cell(RefCell<i64>);

    impl Resolve for Cell {
        fn resolve(&self, view: &ExpressionView) -> Option<Expression> {
            (view.key == ViewKey(0)).then(|| Expression::literal(*self.0.borrow()))
        }
    }

    #[test]
    fn view_renders_current_value() {
        let table = Cell(RefCell::new(1));
        let expr = Expression::binary(
            Expression::symbol("x"),
            "+",
            Expression::view(ViewKey(0), "counter"),
        );
        assert_eq!(expr.render(&table), "x + 1");
        *table.0.borrow_mut() = 42;
        assert_eq!(expr.render(&table), "x + 42");
    }

    #[test]
    fn unknown_view_renders_ellipsis() {
        assert_eq!(Expression::view(ViewKey(7), "missing").to_string(), "...");
    }

    #[test]
    fn resolved_replaces_views() {
        let table = Cell(RefCell::new(5));
        let expr = Expression::from(FunctionCall::new("f").kwarg("n", Expression::view(ViewKey(0), "n")));
        let baked = expr.resolved(&table);
        *table.0.borrow_mut() = 6;
        assert_eq!(baked.to_string(), "f(n=5)");
    }
}
