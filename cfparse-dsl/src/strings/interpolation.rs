//! String interpolation: `"{{ var }}"` placeholders and f-string fields.
//!
//! Parsing locates every placeholder and turns its dotted path into a
//! reference chain. Rendering happens later, when the consumer has values
//! for those references.

use crate::parser::ast::{Expression, ExpressionKind, FormatString, Value};
use cfparse_core::{LocatableString, Namespace, Range};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

static FORMAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\{\{\s*([\.A-Za-z0-9_-]+)\s*\}\})").unwrap());

/// Whether `text` contains at least one `{{ }}` placeholder.
pub fn has_placeholders(text: &str) -> bool {
    FORMAT_RE.is_match(text)
}

// ============================================================================
// PLACEHOLDER LOCATION
// ============================================================================

/// Locate the `{{ path }}` placeholders of a decoded string literal.
///
/// `quote_len` is the number of opening quote characters, which offsets
/// columns on the literal's first line. Returns `(matched text, path)`.
pub(crate) fn locate_placeholders(
    text: &str,
    origin: &LocatableString,
    quote_len: usize,
) -> Vec<(String, LocatableString)> {
    let position = |byte: usize| -> (usize, usize) {
        let before = &text[..byte];
        match before.rfind('\n') {
            None => (
                origin.location.lnr,
                origin.location.start_char + before.chars().count() + quote_len,
            ),
            Some(newline) => (
                origin.location.lnr + before.matches('\n').count(),
                before[newline..].chars().count(),
            ),
        }
    };

    FORMAT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(1)?;
            let path = caps.get(2)?;
            let (lnr, start_char) = position(path.start());
            let (end_lnr, end_char) = position(path.end());
            let range =
                Range::new(origin.location.file.clone(), lnr, start_char, end_lnr, end_char);
            Some((
                whole.as_str().to_string(),
                LocatableString::new(path.as_str(), range, origin.lexpos, origin.namespace.clone()),
            ))
        })
        .collect()
}

/// One parsed piece of an f-string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FStringPiece {
    Literal(String),
    Field(FormatField),
}

/// A `{name!conversion:spec}` replacement field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatField {
    /// Field name as written, surrounding whitespace included.
    pub name: String,
    /// Char offset of `name` inside the f-string body.
    pub offset: usize,
    pub conversion: Option<char>,
    pub spec: String,
    /// Fields nested in `spec`, with their char offsets in the body.
    pub nested: Vec<(String, usize)>,
}

/// Split an f-string body into literal text and replacement fields.
///
/// Follows `str.format` field syntax with one level of nesting in format
/// specs. Errors carry the message without the `Invalid f-string:` prefix.
pub fn parse_fstring(body: &str) -> Result<Vec<FStringPiece>, String> {
    parse_fstring_at(body, 0, true)
}

fn parse_fstring_at(
    body: &str,
    base: usize,
    allow_nested: bool,
) -> Result<Vec<FStringPiece>, String> {
    let chars: Vec<char> = body.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                literal.push('{');
                i += 2;
            }
            '}' if chars.get(i + 1) == Some(&'}') => {
                literal.push('}');
                i += 2;
            }
            '}' => return Err("Single '}' encountered in format string".to_string()),
            '{' => {
                let close = matching_brace(&chars, i)
                    .ok_or_else(|| "expected '}' before end of string".to_string())?;
                if !literal.is_empty() {
                    pieces.push(FStringPiece::Literal(std::mem::take(&mut literal)));
                }
                let field = parse_field(&chars[i + 1..close], base + i + 1, allow_nested)?;
                pieces.push(FStringPiece::Field(field));
                i = close + 1;
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        pieces.push(FStringPiece::Literal(literal));
    }
    Ok(pieces)
}

/// Index of the `}` closing the `{` at `open`, counting nested braces.
fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in chars.iter().enumerate().skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_field(field: &[char], offset: usize, allow_nested: bool) -> Result<FormatField, String> {
    let name_end = field
        .iter()
        .position(|c| *c == '!' || *c == ':')
        .unwrap_or(field.len());
    let name: String = field[..name_end].iter().collect();

    if name.trim().is_empty() || name.trim().chars().all(|c| c.is_ascii_digit()) {
        return Err(
            "positional fields are not supported, use a named field such as {name}".to_string(),
        );
    }
    if name.contains('[') || name.contains('{') {
        return Err(format!("unsupported field name '{}'", name.trim()));
    }

    let mut rest = name_end;
    let mut conversion = None;
    if field.get(rest) == Some(&'!') {
        match field.get(rest + 1) {
            Some(c) if matches!(c, 's' | 'r' | 'a') => conversion = Some(*c),
            Some(c) => return Err(format!("Unknown conversion specifier {}", c)),
            None => {
                return Err("end of string while looking for conversion specifier".to_string())
            }
        }
        rest += 2;
        if rest < field.len() && field[rest] != ':' {
            return Err("expected ':' after conversion specifier".to_string());
        }
    }

    let mut spec = String::new();
    let mut nested = Vec::new();
    if field.get(rest) == Some(&':') {
        spec = field[rest + 1..].iter().collect();
        if spec.contains('{') {
            if !allow_nested {
                return Err("Max string recursion exceeded".to_string());
            }
            for piece in parse_fstring_at(&spec, offset + rest + 1, false)? {
                if let FStringPiece::Field(inner) = piece {
                    nested.push((inner.name, inner.offset));
                }
            }
        }
    }

    Ok(FormatField {
        name,
        offset,
        conversion,
        spec,
        nested,
    })
}

/// Locate the fields of a decoded f-string. `origin` spans the whole token,
/// prefix and quote included.
pub(crate) fn locate_fstring_fields(
    body: &str,
    origin: &LocatableString,
) -> Result<Vec<(String, LocatableString)>, String> {
    let start = origin.location.start_char + 2;
    let locate = |name: &str, offset: usize| {
        let start_char = start + offset;
        let range = Range::new(
            origin.location.file.clone(),
            origin.location.lnr,
            start_char,
            origin.location.lnr,
            start_char + name.chars().count(),
        );
        (
            name.to_string(),
            LocatableString::new(name, range, origin.lexpos, origin.namespace.clone()),
        )
    };

    let mut located = Vec::new();
    for piece in parse_fstring(body)? {
        if let FStringPiece::Field(field) = piece {
            located.push(locate(&field.name, field.offset));
            for (name, offset) in &field.nested {
                located.push(locate(name, *offset));
            }
        }
    }
    Ok(located)
}

// ============================================================================
// REFERENCE CHAINS
// ============================================================================

/// Trim `part` (taken `offset` chars into `var`) and fit its range to the trimmed text.
fn normalize(part: &str, var: &LocatableString, offset: usize) -> LocatableString {
    let start_char = var.location.start_char + offset;
    let end_char = start_char + part.chars().count();
    let left_trimmed = part.trim_start();
    let left_spaces = part.chars().count() - left_trimmed.chars().count();
    let trimmed = left_trimmed.trim_end();
    let right_spaces = left_trimmed.chars().count() - trimmed.chars().count();
    let range = Range::new(
        var.location.file.clone(),
        var.location.lnr,
        start_char + left_spaces,
        var.location.lnr,
        end_char - right_spaces,
    );
    LocatableString::new(trimmed, range, var.lexpos, var.namespace.clone())
}

/// Turn each `a.b.c` path into `Reference(a).b.c`.
pub(crate) fn convert_to_references(
    variables: Vec<(String, LocatableString)>,
    namespace: &Arc<Namespace>,
) -> Vec<(Expression, String)> {
    variables
        .into_iter()
        .map(|(key, var)| {
            let mut parts = var.value.split('.');
            let first = parts.next().unwrap_or_default();
            let root = normalize(first, &var, 0);
            let mut expr = Expression::new(
                ExpressionKind::Reference(root.clone()),
                root.location.clone(),
                namespace.clone(),
                var.lexpos,
            );
            let mut offset = first.chars().count() + 1;
            for part in parts {
                let attribute = normalize(part, &var, offset);
                offset += part.chars().count() + 1;
                expr = Expression::new(
                    ExpressionKind::AttributeReference {
                        instance: Box::new(expr),
                        attribute: attribute.clone(),
                    },
                    attribute.location,
                    namespace.clone(),
                    var.lexpos,
                );
            }
            (expr, key)
        })
        .collect()
}

// ============================================================================
// RENDERING
// ============================================================================

/// What a placeholder's reference evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Value(Value),
    /// The variable holds a reference to another variable, which can not be interpolated.
    Reference,
    /// Not known yet; the whole string is unknown.
    Unknown,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unexpected reference: interpolating variable {name} is not supported")]
    UnexpectedReference { name: String },

    #[error("Invalid f-string: {reason}")]
    InvalidFormat { reason: String },
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e18 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

fn variable_name(expr: &Expression) -> String {
    match &expr.kind {
        ExpressionKind::Reference(name) => name.value.clone(),
        ExpressionKind::AttributeReference {
            instance,
            attribute,
        } => format!("{}.{}", variable_name(instance), attribute.value),
        _ => String::new(),
    }
}

/// Resolve one variable; `Ok(None)` means the value is unknown.
fn resolve_one<F>(expr: &Expression, resolve: &mut F) -> Result<Option<Value>, RenderError>
where
    F: FnMut(&Expression) -> Resolved,
{
    match resolve(expr) {
        Resolved::Value(value) => Ok(Some(value)),
        Resolved::Unknown => Ok(None),
        Resolved::Reference => Err(RenderError::UnexpectedReference {
            name: variable_name(expr),
        }),
    }
}

/// Render a `{{ }}` string. Floats without a fractional part render as integers.
pub fn render_placeholders<F>(
    format: &FormatString,
    mut resolve: F,
) -> Result<Option<String>, RenderError>
where
    F: FnMut(&Expression) -> Resolved,
{
    let mut result = format.format_string.clone();
    for (expr, placeholder) in &format.variables {
        let Some(value) = resolve_one(expr, &mut resolve)? else {
            return Ok(None);
        };
        result = result.replace(placeholder.as_str(), &display_value(&value));
    }
    Ok(Some(result))
}

/// Render an f-string, applying conversions and the
/// `[[fill]align][width][.precision]` part of format specs.
pub fn render_fstring<F>(
    format: &FormatString,
    mut resolve: F,
) -> Result<Option<String>, RenderError>
where
    F: FnMut(&Expression) -> Resolved,
{
    let pieces = parse_fstring(&format.format_string)
        .map_err(|reason| RenderError::InvalidFormat { reason })?;

    let mut lookup = |name: &str| -> Result<Option<Value>, RenderError> {
        match format.variables.iter().find(|(_, key)| key == name) {
            Some((expr, _)) => resolve_one(expr, &mut resolve),
            None => Err(RenderError::InvalidFormat {
                reason: format!("unknown field '{}'", name.trim()),
            }),
        }
    };

    let mut out = String::new();
    for piece in pieces {
        match piece {
            FStringPiece::Literal(text) => out.push_str(&text),
            FStringPiece::Field(field) => {
                let Some(value) = lookup(&field.name)? else {
                    return Ok(None);
                };
                let mut spec = field.spec.clone();
                for (name, _) in &field.nested {
                    let Some(inner) = lookup(name)? else {
                        return Ok(None);
                    };
                    spec = spec.replacen(&format!("{{{}}}", name), &display_value(&inner), 1);
                }
                let text = match field.conversion {
                    Some('r') | Some('a') => match &value {
                        Value::String(s) => format!("'{}'", s),
                        other => display_value(other),
                    },
                    _ => display_value(&value),
                };
                out.push_str(&apply_spec(&text, &value, &spec)?);
            }
        }
    }
    Ok(Some(out))
}

fn apply_spec(text: &str, value: &Value, spec: &str) -> Result<String, RenderError> {
    if spec.is_empty() {
        return Ok(text.to_string());
    }
    let invalid = || RenderError::InvalidFormat {
        reason: format!("unsupported format spec '{}'", spec),
    };

    let chars: Vec<char> = spec.chars().collect();
    let is_align = |c: char| matches!(c, '<' | '>' | '^');
    let (fill, align, mut i) = match (chars.first(), chars.get(1)) {
        (Some(f), Some(a)) if is_align(*a) => (*f, Some(*a), 2),
        (Some(a), _) if is_align(*a) => (' ', Some(*a), 1),
        _ => (' ', None, 0),
    };

    let digits = |i: &mut usize| -> Option<usize> {
        let start = *i;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
        chars[start..*i].iter().collect::<String>().parse().ok()
    };
    let width = digits(&mut i);
    let precision = if chars.get(i) == Some(&'.') {
        i += 1;
        Some(digits(&mut i).ok_or_else(invalid)?)
    } else {
        None
    };
    if i != chars.len() {
        return Err(invalid());
    }

    let body = match (precision, value) {
        (Some(p), Value::Float(f)) => format!("{:.*}", p, f),
        (Some(p), Value::Int(n)) => format!("{:.*}", p, *n as f64),
        (Some(p), _) => text.chars().take(p).collect(),
        (None, _) => text.to_string(),
    };

    let len = body.chars().count();
    let Some(width) = width.filter(|w| *w > len) else {
        return Ok(body);
    };
    let pad = width - len;
    let numeric = matches!(value, Value::Int(_) | Value::Float(_));
    let (left, right) = match align.unwrap_or(if numeric { '>' } else { '<' }) {
        '>' => (pad, 0),
        '^' => (pad / 2, pad - pad / 2),
        _ => (0, pad),
    };
    let fill_str = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();
    Ok(format!("{}{}{}", fill_str(left), body, fill_str(right)))
}

// ============================================================================
// TESTS
// ============================================================================
