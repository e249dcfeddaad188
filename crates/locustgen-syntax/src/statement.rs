//! Statement nodes
//!
//! Statements may span several lines and carry comments. Every variant
//! renders through [`Statement::lines_in`]: header line(s) first, then each
//! body statement one indentation level deeper, or a single `pass` line when
//! the body is empty.

use crate::error::{SyntaxError, SyntaxResult};
use crate::expression::{Expression, Resolve, Unresolved};
use crate::line::{split_lines, Comments, Line};

/// Top-level statements of a generated program
pub type Program = Vec<Statement>;

/// A Python statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Pre-existing block of source code
    OpaqueBlock(OpaqueBlock),
    /// `def name(params): ...`
    Function(Function),
    /// `class Name(bases): ...`
    Class(Class),
    /// `@decorator` applied to another statement
    Decoration(Decoration),
    /// `lhs = rhs`
    Assignment(Assignment),
    /// Expression used as a statement
    Standalone(Standalone),
    /// `if`/`elif`/`else` chain
    IfElse(IfElse),
    /// `import` in its various forms
    Import(Import),
}

impl Statement {
    /// Render without placeholder resolution
    #[must_use]
    pub fn lines(&self, indent_level: usize, comments: bool) -> Vec<Line> {
        self.lines_in(&Unresolved, indent_level, comments)
    }

    /// All lines representing this statement
    ///
    /// - `env`: table resolving placeholders found in expressions
    /// - `indent_level`: indentation of the least indented line
    /// - `comments`: whether attached comments are emitted
    #[must_use]
    pub fn lines_in(&self, env: &dyn Resolve, indent_level: usize, comments: bool) -> Vec<Line> {
        match self {
            Statement::OpaqueBlock(s) => s.lines_in(indent_level, comments),
            Statement::Function(s) => s.lines_in(env, indent_level, comments),
            Statement::Class(s) => s.lines_in(env, indent_level, comments),
            Statement::Decoration(s) => s.lines_in(env, indent_level, comments),
            Statement::Assignment(s) => {
                let line = Line::new(format!("{} = {}", s.lhs, s.rhs.render(env)), indent_level);
                with_comments(&s.comments, line, comments)
            }
            Statement::Standalone(s) => {
                with_comments(&s.comments, Line::new(s.expr.render(env), indent_level), comments)
            }
            Statement::IfElse(s) => s.lines_in(env, indent_level, comments),
            Statement::Import(s) => s.lines_in(indent_level, comments),
        }
    }

    /// Comments attached to this statement
    #[must_use]
    pub fn comments(&self) -> &Comments {
        match self {
            Statement::OpaqueBlock(s) => &s.comments,
            Statement::Function(s) => &s.comments,
            Statement::Class(s) => &s.comments,
            Statement::Decoration(s) => &s.comments,
            Statement::Assignment(s) => &s.comments,
            Statement::Standalone(s) => &s.comments,
            Statement::IfElse(s) => &s.comments,
            Statement::Import(s) => &s.comments,
        }
    }

    /// Mutable access to the attached comments
    pub fn comments_mut(&mut self) -> &mut Comments {
        match self {
            Statement::OpaqueBlock(s) => &mut s.comments,
            Statement::Function(s) => &mut s.comments,
            Statement::Class(s) => &mut s.comments,
            Statement::Decoration(s) => &mut s.comments,
            Statement::Assignment(s) => &mut s.comments,
            Statement::Standalone(s) => &mut s.comments,
            Statement::IfElse(s) => &mut s.comments,
            Statement::Import(s) => &mut s.comments,
        }
    }

    /// Replace the attached comments, builder style
    #[must_use]
    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.comments_mut() = Comments::new(comments);
        self
    }

    /// Copy of this statement with every placeholder known to `env` replaced
    /// by its current expression
    #[must_use]
    pub fn resolved(&self, env: &dyn Resolve) -> Statement {
        let body = |stmts: &[Statement]| -> Vec<Statement> {
            stmts.iter().map(|s| s.resolved(env)).collect()
        };
        match self {
            Statement::OpaqueBlock(_) | Statement::Import(_) => self.clone(),
            Statement::Function(f) => Statement::Function(Function {
                statements: body(&f.statements),
                ..f.clone()
            }),
            Statement::Class(c) => Statement::Class(Class {
                superclasses: c.superclasses.iter().map(|e| e.resolved(env)).collect(),
                statements: body(&c.statements),
                ..c.clone()
            }),
            Statement::Decoration(d) => Statement::Decoration(Decoration {
                decorator: d.decorator.resolved(env),
                target: Box::new(d.target.resolved(env)),
                comments: d.comments.clone(),
            }),
            Statement::Assignment(a) => Statement::Assignment(Assignment {
                lhs: a.lhs.clone(),
                rhs: a.rhs.resolved(env),
                comments: a.comments.clone(),
            }),
            Statement::Standalone(s) => Statement::Standalone(Standalone {
                expr: s.expr.resolved(env),
                comments: s.comments.clone(),
            }),
            Statement::IfElse(i) => Statement::IfElse(IfElse {
                condition_blocks: i
                    .condition_blocks
                    .iter()
                    .map(|(cond, stmts)| (cond.resolved(env), body(stmts)))
                    .collect(),
                else_block: i.else_block.as_deref().map(body),
                comments: i.comments.clone(),
            }),
        }
    }
}

fn with_comments(attached: &Comments, line: Line, comments: bool) -> Vec<Line> {
    if comments {
        attached.attach(line)
    } else {
        vec![line]
    }
}

fn body_lines(
    statements: &[Statement],
    env: &dyn Resolve,
    indent_level: usize,
    comments: bool,
) -> Vec<Line> {
    let lines: Vec<Line> = statements
        .iter()
        .flat_map(|s| s.lines_in(env, indent_level, comments))
        .collect();
    if lines.is_empty() {
        vec![Line::new("pass", indent_level)]
    } else {
        lines
    }
}

/// A block of code already represented as a string
///
/// Useful to move existing snippets into the tree, or to express constructs
/// the tree does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBlock {
    block: String,
    /// Comment lines emitted above the block
    pub comments: Comments,
}

impl OpaqueBlock {
    /// Tabs expand to this many columns before dedenting.
    pub const TAB_SIZE: usize = 8;

    /// # Errors
    /// [`SyntaxError::EmptyOpaqueBlock`] if `block` is only whitespace
    pub fn new(block: impl Into<String>) -> SyntaxResult<Self> {
        let block = block.into();
        if block.trim().is_empty() {
            return Err(SyntaxError::EmptyOpaqueBlock(block));
        }
        Ok(Self {
            block,
            comments: Comments::none(),
        })
    }

    /// Original text of the block
    #[inline]
    #[must_use]
    pub fn block(&self) -> &str {
        &self.block
    }

    fn lines_in(&self, indent_level: usize, comments: bool) -> Vec<Line> {
        let raw: Vec<String> = split_lines(&self.block)
            .into_iter()
            .map(|l| expand_tabs(l, Self::TAB_SIZE))
            .collect();
        let is_blank = |l: &String| l.trim().is_empty();
        // Construction guarantees at least one non-blank line.
        let first = raw.iter().position(|l| !is_blank(l)).unwrap_or(0);
        let end = raw.iter().rposition(|l| !is_blank(l)).map_or(raw.len(), |i| i + 1);
        let raw = &raw[first..end];

        let shortest_indent = raw
            .iter()
            .filter(|l| !is_blank(l))
            .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0);

        let block_lines = raw.iter().map(|l| {
            let text = if is_blank(l) {
                String::new()
            } else {
                l.chars().skip(shortest_indent).collect()
            };
            Line::new(text, indent_level)
        });

        let mut lines = if comments {
            self.comments.to_lines(indent_level)
        } else {
            Vec::new()
        };
        lines.extend(block_lines);
        lines
    }
}

fn expand_tabs(line: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = tab_size - column % tab_size;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    /// Body of the function
    pub statements: Vec<Statement>,
    pub comments: Comments,
}

impl Function {
    #[must_use]
    pub fn new<P: Into<String>>(
        name: impl Into<String>,
        params: impl IntoIterator<Item = P>,
        statements: Vec<Statement>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            statements,
            comments: Comments::none(),
        }
    }

    fn lines_in(&self, env: &dyn Resolve, indent_level: usize, comments: bool) -> Vec<Line> {
        let top = Line::new(
            format!("def {}({}):", self.name, self.params.join(", ")),
            indent_level,
        );
        let mut lines = with_comments(&self.comments, top, comments);
        lines.extend(body_lines(&self.statements, env, indent_level + 1, comments));
        lines
    }
}

/// A class definition
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    /// Base classes; anything valid in an argument list works here
    pub superclasses: Vec<Expression>,
    /// Fields of the class: methods, attributes, nested classes
    pub statements: Vec<Statement>,
    pub comments: Comments,
}

impl Class {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        superclasses: Vec<Expression>,
        statements: Vec<Statement>,
    ) -> Self {
        Self {
            name: name.into(),
            superclasses,
            statements,
            comments: Comments::none(),
        }
    }

    fn lines_in(&self, env: &dyn Resolve, indent_level: usize, comments: bool) -> Vec<Line> {
        let bases = if self.superclasses.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = self.superclasses.iter().map(|e| e.render(env)).collect();
            format!("({})", names.join(", "))
        };
        let top = Line::new(format!("class {}{}:", self.name, bases), indent_level);
        let mut lines = with_comments(&self.comments, top, comments);
        lines.extend(body_lines(&self.statements, env, indent_level + 1, comments));
        lines
    }
}

/// A function or class definition with a decorator applied (`@task`)
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    /// Decorator, e.g. a symbol `task` or a call `task(3)`
    pub decorator: Expression,
    pub target: Box<Statement>,
    pub comments: Comments,
}

impl Decoration {
    #[must_use]
    pub fn new(decorator: impl Into<Expression>, target: Statement) -> Self {
        Self {
            decorator: decorator.into(),
            target: Box::new(target),
            comments: Comments::none(),
        }
    }

    fn lines_in(&self, env: &dyn Resolve, indent_level: usize, comments: bool) -> Vec<Line> {
        let top = Line::new(format!("@{}", self.decorator.render(env)), indent_level);
        let mut lines = with_comments(&self.comments, top, comments);
        lines.extend(self.target.lines_in(env, indent_level, comments));
        lines
    }
}

/// Assignment of a value to a name
///
/// Chained assignments (`a = b = 1`) are not modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target name (or comma-separated names)
    pub lhs: String,
    pub rhs: Expression,
    pub comments: Comments,
}

impl Assignment {
    #[must_use]
    pub fn new(lhs: impl Into<String>, rhs: impl Into<Expression>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
            comments: Comments::none(),
        }
    }
}

/// Wraps an [`Expression`] so that it can be used as a statement
#[derive(Debug, Clone, PartialEq)]
pub struct Standalone {
    pub expr: Expression,
    pub comments: Comments,
}

impl Standalone {
    #[must_use]
    pub fn new(expr: impl Into<Expression>) -> Self {
        Self {
            expr: expr.into(),
            comments: Comments::none(),
        }
    }
}

/// The `if`/`elif`/`else` construct
#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    condition_blocks: Vec<(Expression, Vec<Statement>)>,
    else_block: Option<Vec<Statement>>,
    pub comments: Comments,
}

impl IfElse {
    /// The first pair is the `if` clause, the following ones are `elif`s.
    ///
    /// # Errors
    /// [`SyntaxError::EmptyIfElse`] if `condition_blocks` is empty
    pub fn new(
        condition_blocks: Vec<(Expression, Vec<Statement>)>,
        else_block: Option<Vec<Statement>>,
    ) -> SyntaxResult<Self> {
        if condition_blocks.is_empty() {
            return Err(SyntaxError::EmptyIfElse);
        }
        Ok(Self {
            condition_blocks,
            else_block,
            comments: Comments::none(),
        })
    }

    #[inline]
    #[must_use]
    pub fn condition_blocks(&self) -> &[(Expression, Vec<Statement>)] {
        &self.condition_blocks
    }

    #[inline]
    #[must_use]
    pub fn else_block(&self) -> Option<&[Statement]> {
        self.else_block.as_deref()
    }

    fn lines_in(&self, env: &dyn Resolve, indent_level: usize, comments: bool) -> Vec<Line> {
        let mut lines = Vec::new();
        for (i, (condition, statements)) in self.condition_blocks.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            let header = Line::new(format!("{keyword} {}:", condition.render(env)), indent_level);
            if i == 0 {
                lines.extend(with_comments(&self.comments, header, comments));
            } else {
                lines.push(header);
            }
            lines.extend(body_lines(statements, env, indent_level + 1, comments));
        }
        if let Some(else_block) = self.else_block.as_deref().filter(|b| !b.is_empty()) {
            lines.push(Line::new("else:", indent_level));
            lines.extend(body_lines(else_block, env, indent_level + 1, comments));
        }
        lines
    }
}

/// The import statement: `import X`, `import X as A`, `from M import X`,
/// `from M import X as A`
///
/// Several targets render as one import line each.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    targets: Vec<String>,
    source: Option<String>,
    alias: Option<String>,
    /// Comment lines emitted above the imports
    pub comments: Comments,
}

impl Import {
    /// # Errors
    /// - [`SyntaxError::NoImportTargets`] if `targets` is empty
    /// - [`SyntaxError::AliasWithMultipleTargets`] if `alias` is given along
    ///   with more than one target
    pub fn new<T: Into<String>>(
        targets: impl IntoIterator<Item = T>,
        source: Option<&str>,
        alias: Option<&str>,
    ) -> SyntaxResult<Self> {
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        if targets.is_empty() {
            return Err(SyntaxError::NoImportTargets);
        }
        if let (Some(alias), true) = (alias, targets.len() > 1) {
            return Err(SyntaxError::AliasWithMultipleTargets {
                alias: alias.to_string(),
                targets,
            });
        }
        Ok(Self {
            targets,
            source: source.map(str::to_string),
            alias: alias.map(str::to_string),
            comments: Comments::none(),
        })
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn lines_in(&self, indent_level: usize, comments: bool) -> Vec<Line> {
        let keyword = match &self.source {
            Some(source) => format!("from {source} import"),
            None => "import".to_string(),
        };
        let alias = self
            .alias
            .as_ref()
            .map(|a| format!(" as {a}"))
            .unwrap_or_default();
        let mut lines = if comments {
            self.comments.to_lines(indent_level)
        } else {
            Vec::new()
        };
        lines.extend(
            self.targets
                .iter()
                .map(|t| Line::new(format!("{keyword} {t}{alias}"), indent_level)),
        );
        lines
    }
}

macro_rules! impl_from_node {
    ($($node:ident),* $(,)?) => {
        $(
            impl From<$node> for Statement {
                fn from(node: $node) -> Self {
                    Statement::$node(node)
                }
            }
        )*
    };
}

impl_from_node!(
    OpaqueBlock,
    Function,
    Class,
    Decoration,
    Assignment,
    Standalone,
    IfElse,
    Import,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(stmt: &Statement) -> Vec<String> {
        stmt.lines(0, true).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn opaque_block_rejects_whitespace() {
        assert!(matches!(
            OpaqueBlock::new(" \n\t "),
            Err(SyntaxError::EmptyOpaqueBlock(_))
        ));
    }

    #[test]
    fn opaque_block_dedents_and_trims() {
        let block = OpaqueBlock::new("\n\n    a = 1\n\n      if a:\n\tb()\n  \n").unwrap();
        let lines: Vec<String> = Statement::from(block)
            .lines(1, true)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            vec!["    a = 1", "", "      if a:", "        b()"]
        );
    }

    #[test]
    fn opaque_block_comments_go_above() {
        let stmt = Statement::from(OpaqueBlock::new("x").unwrap()).with_comments(["only"]);
        assert_eq!(text(&stmt), vec!["# only", "x"]);
    }

    #[test]
    fn empty_function_gets_pass() {
        let f = Function::new("f", ["self"], vec![]);
        assert_eq!(text(&f.into()), vec!["def f(self):", "    pass"]);
    }

    #[test]
    fn function_comment_inline_or_above() {
        let body = vec![Statement::from(Assignment::new("x", Expression::literal(1)))];
        let f = Statement::from(Function::new("f", Vec::<String>::new(), body));
        assert_eq!(
            text(&f.clone().with_comments(["c"])),
            vec!["def f():  # c", "    x = 1"]
        );
        assert_eq!(
            text(&f.clone().with_comments(["c", "d"])),
            vec!["# c", "# d", "def f():", "    x = 1"]
        );
        let no_comments: Vec<String> = f
            .with_comments(["c"])
            .lines(0, false)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(no_comments, vec!["def f():", "    x = 1"]);
    }

    #[test]
    fn class_with_bases_and_empty_body() {
        let c = Class::new(
            "A",
            vec![Expression::symbol("B"), Expression::symbol("metaclass=M")],
            vec![],
        );
        assert_eq!(text(&c.into()), vec!["class A(B, metaclass=M):", "    pass"]);
        let bare = Class::new("A", vec![], vec![]);
        assert_eq!(text(&bare.into()), vec!["class A:", "    pass"]);
    }

    #[test]
    fn decoration_precedes_target() {
        let d = Decoration::new(
            crate::FunctionCall::new("task").arg(Expression::literal(3)),
            Function::new("f", ["self"], vec![]).into(),
        );
        assert_eq!(text(&d.into()), vec!["@task(3)", "def f(self):", "    pass"]);
    }

    #[test]
    fn if_else_requires_a_branch() {
        assert_eq!(IfElse::new(vec![], None), Err(SyntaxError::EmptyIfElse));
    }

    #[test]
    fn if_elif_else() {
        let stmt = IfElse::new(
            vec![
                (Expression::symbol("a"), vec![]),
                (
                    Expression::symbol("b"),
                    vec![Standalone::new(Expression::symbol("x")).into()],
                ),
            ],
            Some(vec![Standalone::new(Expression::symbol("y")).into()]),
        )
        .unwrap();
        let stmt = Statement::from(stmt).with_comments(["why"]);
        assert_eq!(
            text(&stmt),
            vec!["if a:  # why", "    pass", "elif b:", "    x", "else:", "    y"]
        );
    }

    #[test]
    fn import_forms() {
        let plain = Import::new(["re"], None, None).unwrap();
        assert_eq!(text(&plain.into()), vec!["import re"]);

        let aliased = Import::new(["numpy"], None, Some("np")).unwrap();
        assert_eq!(text(&aliased.into()), vec!["import numpy as np"]);

        let from = Import::new(["a", "b"], Some("m"), None).unwrap();
        assert_eq!(text(&from.into()), vec!["from m import a", "from m import b"]);
    }

    #[test]
    fn import_rejects_invalid_shapes() {
        assert_eq!(
            Import::new(Vec::<String>::new(), None, None),
            Err(SyntaxError::NoImportTargets)
        );
        assert!(matches!(
            Import::new(["a", "b"], Some("m"), Some("z")),
            Err(SyntaxError::AliasWithMultipleTargets { .. })
        ));
    }

    #[test]
    fn structural_equality_includes_comments() {
        let a = Statement::from(Assignment::new("x", Expression::literal(1)));
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, b.with_comments(["c"]));
    }
}
