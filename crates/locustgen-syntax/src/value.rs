//! Literal values and their Python source representation
//!
//! [`Value`] covers primitives, nested containers and embedded expressions.
//! Rendering is plain structural recursion: containers render their items as
//! literals, except [`Value::Expr`] items which render as expressions.

use crate::expression::{Expression, Resolve};

/// A Python literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal, wide enough for any JSON integer
    Int(i128),
    /// Float literal
    Float(f64),
    /// `str` literal
    Str(String),
    /// `bytes` literal
    Bytes(Vec<u8>),
    /// `[...]`
    List(Vec<Value>),
    /// `(...)`
    Tuple(Vec<Value>),
    /// `{k: v, ...}`, in insertion order
    Dict(Vec<(Value, Value)>),
    /// Expression embedded in a container, rendered as code
    Expr(Box<Expression>),
}

impl Value {
    /// `bytes` value
    #[inline]
    #[must_use]
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// `str` value
    #[inline]
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Dict with string keys
    #[must_use]
    pub fn str_dict<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Dict(
            pairs
                .into_iter()
                .map(|(k, v)| (Value::Str(k.into()), v.into()))
                .collect(),
        )
    }

    /// Append to a list or tuple value; other kinds are left untouched.
    ///
    /// Returns whether the item was appended.
    pub fn push(&mut self, item: Value) -> bool {
        match self {
            Value::List(items) | Value::Tuple(items) => {
                items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Python source for this value
    pub(crate) fn write_repr(&self, out: &mut String, env: &dyn Resolve) {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Float(x) => out.push_str(&float_repr(*x)),
            Value::Str(s) => out.push_str(&str_repr(s)),
            Value::Bytes(b) => out.push_str(&bytes_repr(b)),
            Value::List(items) => {
                out.push('[');
                write_items(out, items, env);
                out.push(']');
            }
            Value::Tuple(items) => {
                out.push('(');
                write_items(out, items, env);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::Dict(pairs) => {
                out.push('{');
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out, env);
                    out.push_str(": ");
                    v.write_repr(out, env);
                }
                out.push('}');
            }
            Value::Expr(expr) => out.push_str(&expr.render(env)),
        }
    }

    pub(crate) fn resolved(&self, env: &dyn Resolve) -> Value {
        match self {
            Value::List(items) => Value::List(items.iter().map(|v| v.resolved(env)).collect()),
            Value::Tuple(items) => Value::Tuple(items.iter().map(|v| v.resolved(env)).collect()),
            Value::Dict(pairs) => Value::Dict(
                pairs
                    .iter()
                    .map(|(k, v)| (k.resolved(env), v.resolved(env)))
                    .collect(),
            ),
            Value::Expr(expr) => Value::Expr(Box::new(expr.resolved(env))),
            other => other.clone(),
        }
    }
}

fn write_items(out: &mut String, items: &[Value], env: &dyn Resolve) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out, env);
    }
}

/// Python `repr()` of a float, in positional notation.
#[must_use]
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "float('nan')".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 {
            "float('inf')".to_string()
        } else {
            "-float('inf')".to_string()
        };
    }
    let mut s = x.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn quote_for(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// Python `repr()` of a `str`.
#[must_use]
pub fn str_repr(s: &str) -> String {
    let quote = quote_for(s.contains('\''), s.contains('"'));
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
        }
    }
    out.push(quote);
    out
}

/// Python `repr()` of a `bytes` object.
#[must_use]
pub fn bytes_repr(b: &[u8]) -> String {
    let quote = quote_for(b.contains(&b'\''), b.contains(&b'"'));
    let mut out = String::with_capacity(b.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in b {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            c if c as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push(quote);
    out
}

// Approximates str.isprintable(): controls, separators other than the
// ASCII space, format characters and private use code points are escaped.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{ad}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{feff}'
            | '\u{e000}'..='\u{f8ff}'
    )
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Expression> for Value {
    fn from(e: Expression) -> Self {
        Value::Expr(Box::new(e))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::from(i),
                (None, Some(u)) => Value::from(u),
                (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            Json::Object(map) => Value::Dict(
                map.iter()
                    .map(|(k, v)| (Value::Str(k.clone()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Unresolved;

    fn repr(v: &Value) -> String {
        let mut out = String::new();
        v.write_repr(&mut out, &Unresolved);
        out
    }

    #[test]
    fn primitives() {
        assert_eq!(repr(&Value::None), "None");
        assert_eq!(repr(&Value::Bool(true)), "True");
        assert_eq!(repr(&Value::Int(-3)), "-3");
        assert_eq!(repr(&Value::Float(2.0)), "2.0");
        assert_eq!(repr(&Value::Float(0.5)), "0.5");
        assert_eq!(repr(&Value::Float(f64::INFINITY)), "float('inf')");
    }

    #[test]
    fn strings_pick_quotes_like_python() {
        assert_eq!(str_repr("x"), "'x'");
        assert_eq!(str_repr("it's"), "\"it's\"");
        assert_eq!(str_repr("'\""), "'\\'\"'");
        assert_eq!(str_repr("a\nb\\"), "'a\\nb\\\\'");
        assert_eq!(str_repr("\u{1}"), "'\\x01'");
        assert_eq!(str_repr("é"), "'é'");
    }

    #[test]
    fn bytes_escape_non_ascii() {
        assert_eq!(bytes_repr(b"a=1&b=2"), "b'a=1&b=2'");
        assert_eq!(bytes_repr(&[0xff, b'\'']), "b\"\\xff'\"");
    }

    #[test]
    fn containers() {
        let v = Value::List(vec![
            Value::Int(1),
            Value::str_dict([("a", Value::Tuple(vec![Value::Int(2)]))]),
            Value::Tuple(vec![]),
        ]);
        assert_eq!(repr(&v), "[1, {'a': (2,)}, ()]");
    }

    #[test]
    fn embedded_expressions_render_as_code() {
        let v = Value::List(vec![
            Value::Int(1),
            Value::str_dict([("a", Expression::fstring("-{x}"))]),
        ]);
        assert_eq!(repr(&v), "[1, {'a': f'-{x}'}]");
    }

    #[test]
    fn json_keeps_key_order() {
        let json: serde_json::Value = serde_json::from_str(r#"{"b": [1, 2.5], "a": null}"#).unwrap();
        assert_eq!(repr(&Value::from(&json)), "{'b': [1, 2.5], 'a': None}");
    }

    #[test]
    fn json_integers_beyond_i64_stay_exact() {
        let json: serde_json::Value =
            serde_json::from_str("[18446744073709551615, -9223372036854775808]").unwrap();
        assert_eq!(
            repr(&Value::from(&json)),
            "[18446744073709551615, -9223372036854775808]"
        );
    }

    #[test]
    fn push_only_into_sequences() {
        let mut list = Value::List(vec![]);
        assert!(list.push(Value::Int(1)));
        let mut int = Value::Int(0);
        assert!(!int.push(Value::Int(1)));
        assert_eq!(list, Value::List(vec![Value::Int(1)]));
    }
}
