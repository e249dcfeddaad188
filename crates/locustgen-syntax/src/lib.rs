//! Python syntax tree for code generation
//!
//! A deliberately small model of Python source: enough to describe a
//! locustfile, not a general-purpose AST. Nodes render to indented
//! [`Line`]s; comments are attached to statements, never to expressions.
//!
//! # Node kinds
//!
//! - **Expressions** ([`Expression`]): literals, f-strings, symbols, calls,
//!   binary operations, and [`ExpressionView`] placeholders resolved at
//!   render time through a [`Resolve`] table
//! - **Statements** ([`Statement`]): opaque blocks, functions, classes,
//!   decorations, assignments, standalone expressions, `if`/`else`, imports
//!
//! # Example
//!
//! ```rust
//! use locustgen_syntax::{Assignment, Expression, Function, Statement};
//!
//! let f = Statement::from(Function::new(
//!     "f",
//!     ["self"],
//!     vec![Assignment::new("x", Expression::literal(1)).into()],
//! ));
//! let text: Vec<String> = f.lines(0, true).iter().map(ToString::to_string).collect();
//! assert_eq!(text, ["def f(self):", "    x = 1"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod expression;
pub mod line;
pub mod statement;
pub mod value;

pub use error::{SyntaxError, SyntaxResult};
pub use expression::{
    BinaryOp, Expression, ExpressionView, FunctionCall, Resolve, Symbol, Unresolved, ViewKey,
};
pub use line::{split_lines, Comments, Line};
pub use statement::{
    Assignment, Class, Decoration, Function, IfElse, Import, OpaqueBlock, Program, Standalone,
    Statement,
};
pub use value::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building syntax trees
    pub use crate::expression::{Expression, FunctionCall, Resolve, Symbol};
    pub use crate::line::{Comments, Line};
    pub use crate::statement::{
        Assignment, Class, Decoration, Function, IfElse, Import, OpaqueBlock, Program,
        Standalone, Statement,
    };
    pub use crate::value::Value;
}
