//! Opaque, comparable metadata values.
//!
//! [`Datum`] carries everything a tree spec needs to remember about a
//! container besides its arity: mapping keys, record descriptors, and the
//! auxiliary data a custom registration hands back from `to_children`.

use std::collections::HashSet;
use std::fmt::{self, Write};

/// A self-describing metadata value.
///
/// Compared and hashed by value, so it can key an insertion-ordered map
/// and two specs built from equal shapes compare equal.
///
/// # Examples
///
/// ```
/// use canopy_core::Datum;
///
/// let key = Datum::from("a");
/// assert_eq!(key.repr(), "'a'");
/// assert_eq!(key.to_string(), "a");
///
/// let pair = Datum::Tuple(vec![Datum::Int(1)]);
/// assert_eq!(pair.repr(), "(1,)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datum {
    /// The unit value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A UTF-8 string.
    Str(String),
    /// A fixed-length ordered sequence.
    Tuple(Vec<Datum>),
    /// A variable-length ordered sequence.
    List(Vec<Datum>),
}

impl Datum {
    /// Literal rendering, used for mapping keys: strings are quoted,
    /// booleans are `True`/`False`, one-element tuples keep their comma.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) -> fmt::Result {
        match self {
            Self::None => out.write_str("None"),
            Self::Bool(true) => out.write_str("True"),
            Self::Bool(false) => out.write_str("False"),
            Self::Int(v) => write!(out, "{v}"),
            Self::Str(s) => write_quoted(out, s),
            Self::Tuple(items) => {
                out.push('(');
                write_items(out, items)?;
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
                Ok(())
            }
            Self::List(items) => {
                out.push('[');
                write_items(out, items)?;
                out.push(']');
                Ok(())
            }
        }
    }

    /// Returns the string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the elements if this is a `Tuple` or a `List`.
    pub fn as_seq(&self) -> Option<&[Datum]> {
        match self {
            Self::Tuple(items) | Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The first key in `keys` that repeats an earlier one.
    pub fn first_duplicate(keys: &[Datum]) -> Option<&Datum> {
        let mut seen = HashSet::with_capacity(keys.len());
        keys.iter().find(|key| !seen.insert(*key))
    }
}

fn write_items(out: &mut String, items: &[Datum]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out)?;
    }
    Ok(())
}

fn write_quoted(out: &mut String, s: &str) -> fmt::Result {
    // Prefer single quotes; switch to double quotes when that avoids escaping.
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    Ok(())
}

/// Plain rendering: strings appear without quotes, everything else as
/// in [`Datum::repr`].
impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            other => f.write_str(&other.repr()),
        }
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<()> for Datum {
    fn from(_: ()) -> Self {
        Self::None
    }
}
