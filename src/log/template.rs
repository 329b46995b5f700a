//! Runtime `{}` templates.
//!
//! Both the message a caller passes to [`Logger::log`](crate::log::logger::Logger::log)
//! and the logger's own line template use the same small grammar:
//!
//! - `{}` takes the next positional value,
//! - `{0}`, `{1}`, ... take a positional value by index,
//! - `{name}` takes a named value,
//! - `{{` and `}}` are literal braces.
//!
//! Format specs such as `{:>4}` are rejected.

use std::fmt::{self, Debug, Display};

use crate::log::log_error::FormatError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Auto,
    Index(usize),
    Named(String),
}

/// How [`Template::fill`] treats values the template never references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unused {
    /// Every supplied value must appear in the template.
    Reject,
    /// Extra values are ignored.
    Allow,
}

/// A parsed template, ready to be filled any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source`, failing on unbalanced braces or mixed numbering.
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();
        let mut saw_auto = false;
        let mut saw_index = false;

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.next_if(|&(_, n)| n == '{').is_some() {
                        literal.push('{');
                        continue;
                    }

                    let mut field = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        match n {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(FormatError::UnclosedBrace(pos)),
                            other => field.push(other),
                        }
                    }
                    if !closed {
                        return Err(FormatError::UnclosedBrace(pos));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let segment = parse_field(field)?;
                    match segment {
                        Segment::Auto => saw_auto = true,
                        Segment::Index(_) => saw_index = true,
                        _ => {}
                    }
                    if saw_auto && saw_index {
                        return Err(FormatError::MixedNumbering);
                    }
                    segments.push(segment);
                }
                '}' => {
                    if chars.next_if(|&(_, n)| n == '}').is_some() {
                        literal.push('}');
                    } else {
                        return Err(FormatError::StrayBrace(pos));
                    }
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: source.to_string(),
            segments,
        })
    }

    /// The source text this template was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template contains no placeholders at all.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// True when `{name}` appears in the template.
    #[must_use]
    pub fn uses(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Named(n) if n == name))
    }

    /// Checks that every placeholder is one of `allowed` named fields.
    pub fn ensure_named_within(&self, allowed: &[&str]) -> Result<(), FormatError> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => {}
                Segment::Named(n) if allowed.contains(&n.as_str()) => {}
                Segment::Named(n) => return Err(FormatError::UnknownPlaceholder(n.clone())),
                Segment::Auto => return Err(FormatError::UnknownPlaceholder("{}".into())),
                Segment::Index(i) => {
                    return Err(FormatError::UnknownPlaceholder(format!("{{{i}}}")));
                }
            }
        }
        Ok(())
    }

    /// Substitutes `args` into the template.
    pub fn fill(&self, args: &FormatArgs, unused: Unused) -> Result<String, FormatError> {
        let mut out = String::with_capacity(self.raw.len() + 16);
        let mut next_auto = 0usize;
        let mut used_positional = vec![false; args.positional.len()];
        let mut used_named = vec![false; args.named.len()];

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Auto | Segment::Index(_) => {
                    let index = match segment {
                        Segment::Index(i) => *i,
                        _ => {
                            next_auto += 1;
                            next_auto - 1
                        }
                    };
                    let value = args
                        .positional
                        .get(index)
                        .ok_or(FormatError::MissingPositional(index))?;
                    used_positional[index] = true;
                    out.push_str(value);
                }
                Segment::Named(name) => {
                    let slot = args
                        .named
                        .iter()
                        .position(|(k, _)| k == name)
                        .ok_or_else(|| FormatError::MissingNamed(name.clone()))?;
                    used_named[slot] = true;
                    out.push_str(&args.named[slot].1);
                }
            }
        }

        if unused == Unused::Reject {
            let leftover = used_positional.iter().filter(|used| !**used).count();
            if leftover > 0 {
                return Err(FormatError::UnusedPositional(leftover));
            }
            if let Some(slot) = used_named.iter().position(|used| !*used) {
                return Err(FormatError::UnusedNamed(args.named[slot].0.clone()));
            }
        }

        Ok(out)
    }
}

fn parse_field(field: String) -> Result<Segment, FormatError> {
    if field.contains([':', '!']) {
        return Err(FormatError::UnsupportedSpec(field));
    }
    if field.is_empty() {
        return Ok(Segment::Auto);
    }
    if field.bytes().all(|b| b.is_ascii_digit()) {
        return field
            .parse()
            .map(Segment::Index)
            .map_err(|_| FormatError::UnsupportedSpec(field));
    }
    Ok(Segment::Named(field))
}

/// Positional and named values for a template, already rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatArgs {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl FormatArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Display) -> Self {
        self.push(value);
        self
    }

    /// Adds a named value, replacing an earlier one with the same key.
    #[must_use]
    pub fn named(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn push(&mut self, value: impl Display) {
        self.positional.push(value.to_string());
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.named.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.named.push((key, value)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<&[&dyn Display]> for FormatArgs {
    fn from(values: &[&dyn Display]) -> Self {
        Self {
            positional: values.iter().map(ToString::to_string).collect(),
            named: Vec::new(),
        }
    }
}

impl<const N: usize> From<&[&dyn Display; N]> for FormatArgs {
    fn from(values: &[&dyn Display; N]) -> Self {
        Self::from(&values[..])
    }
}

/// A value logged by type and `Debug` representation instead of through a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    name: Option<String>,
    type_name: String,
    repr: String,
}

impl Value {
    pub fn of<T: Debug + ?Sized>(value: &T) -> Self {
        Self {
            name: None,
            type_name: short_type_name(std::any::type_name::<T>()),
            repr: format!("{value:?}"),
        }
    }

    pub fn named<T: Debug + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::of(value)
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn repr(&self) -> &str {
        &self.repr
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} = ")?;
        }
        write!(f, "({}, {})", self.type_name, self.repr)
    }
}

/// Renders `values` one per line.
#[must_use]
pub fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strips module paths from every path inside a `type_name` string.
///
/// `alloc::vec::Vec<core::option::Option<i32>>` becomes `Vec<Option<i32>>`.
pub(crate) fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut out = String::with_capacity(full.len());
    let mut path = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            path.push(c);
        } else {
            out.push_str(last_segment(&path));
            path.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&path));
    out
}
