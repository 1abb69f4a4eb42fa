//! Property identifiers and identifier templates.
//!
//! A property id names a scalar or map-valued property as a category path and a leaf joined by
//! [`SEPARATOR`], e.g. `Hosts/host_name` or `metrics/jvm/gcCount`. Ids declared by providers may
//! embed `$N` capture arguments (optionally followed by a transform directive); those are parsed
//! once into a [`PropertyTemplate`].

use crate::error::PropertyIdError;
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::Display;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PropertyId(String);

impl PropertyId {
    pub fn new(id: impl AsRef<str>) -> Self { PropertyId(normalize(id.as_ref())) }

    /// Join a category and a leaf name
    pub fn join(category: &str, name: &str) -> Self {
        if category.is_empty() {
            PropertyId::new(name)
        } else {
            PropertyId::new(format!("{}{}{}", category, SEPARATOR, name))
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn category(&self) -> Option<&str> { category(&self.0) }

    pub fn name(&self) -> &str { name(&self.0) }

    /// True when the id embeds a `$N` capture argument
    pub fn has_arguments(&self) -> bool { has_arguments(&self.0) }

    /// True if `self` is a strict ancestor category of `other`
    pub fn is_category_of(&self, other: &str) -> bool {
        other.len() > self.0.len() && other.starts_with(self.0.as_str()) && other[self.0.len()..].starts_with(SEPARATOR)
    }
}

impl Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for PropertyId {
    fn borrow(&self) -> &str { &self.0 }
}

impl AsRef<str> for PropertyId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::ops::Deref for PropertyId {
    type Target = str;
    fn deref(&self) -> &str { &self.0 }
}

impl From<&str> for PropertyId {
    fn from(id: &str) -> Self { PropertyId::new(id) }
}

impl From<String> for PropertyId {
    fn from(id: String) -> Self { PropertyId::new(id) }
}

impl From<&String> for PropertyId {
    fn from(id: &String) -> Self { PropertyId::new(id) }
}

impl From<&PropertyId> for PropertyId {
    fn from(id: &PropertyId) -> Self { id.clone() }
}

impl From<PropertyId> for String {
    fn from(id: PropertyId) -> Self { id.0 }
}

/// Trim whitespace, collapse repeated separators and strip leading/trailing ones.
/// Quoted sections (template directives) are copied verbatim.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_quotes = false;
    for c in raw.trim().chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c == SEPARATOR && !in_quotes && (out.is_empty() || out.ends_with(SEPARATOR)) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

/// Byte offset of the last separator that is not inside a quoted section
fn last_separator(id: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut last = None;
    for (i, c) in id.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            SEPARATOR if !in_quotes => last = Some(i),
            _ => {}
        }
    }
    last
}

/// The category portion of an id, `None` for root-level ids
pub fn category(id: &str) -> Option<&str> { last_separator(id).map(|i| &id[..i]) }

/// The leaf name of an id
pub fn name(id: &str) -> &str {
    match last_separator(id) {
        Some(i) => &id[i + 1..],
        None => id,
    }
}

pub fn has_arguments(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.windows(2).any(|w| w[0] == b'$' && w[1].is_ascii_digit())
}

/// Every ancestor category of every given id
pub fn categories<'a, I>(ids: I) -> IndexSet<String>
where I: IntoIterator<Item = &'a PropertyId> {
    let mut out = IndexSet::new();
    for id in ids {
        let mut current = id.category();
        while let Some(cat) = current {
            if !out.insert(cat.to_string()) {
                break;
            }
            current = category(cat);
        }
    }
    out
}

/// How a captured argument is rewritten when it is substituted into a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTransform {
    /// `$N`
    Verbatim,
    /// `$N.replaceAll("([.])","/")`
    DotsToSlashes,
    /// `$N.replaceAll("[^-_A-Za-z0-9]","")`
    StripPunctuation,
}

impl CaptureTransform {
    fn from_replace_all(pattern: &str, replacement: &str) -> Option<Self> {
        match (pattern, replacement) {
            ("([.])" | "[.]" | "\\\\." | "\\.", "/") => Some(CaptureTransform::DotsToSlashes),
            ("[^-_A-Za-z0-9]" | "[^A-Za-z0-9]" | "[^a-zA-Z0-9]", "") => Some(CaptureTransform::StripPunctuation),
            _ => None,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            CaptureTransform::Verbatim => "",
            CaptureTransform::DotsToSlashes => ".replaceAll(\"([.])\",\"/\")",
            CaptureTransform::StripPunctuation => ".replaceAll(\"[^-_A-Za-z0-9]\",\"\")",
        }
    }

    pub fn apply(&self, arg: &str) -> String {
        match self {
            CaptureTransform::Verbatim => arg.to_string(),
            CaptureTransform::DotsToSlashes => arg.replace('.', "/"),
            CaptureTransform::StripPunctuation => arg.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_').collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture { index: usize, transform: CaptureTransform },
}

/// A declared property id with `$N` capture arguments, compiled for matching.
#[derive(Debug, Clone)]
pub struct PropertyTemplate {
    id: PropertyId,
    segments: Vec<Segment>,
    pattern: Regex,
}

impl PartialEq for PropertyTemplate {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl PropertyTemplate {
    pub fn parse(id: &PropertyId) -> Result<Self, PropertyIdError> {
        let segments = parse_segments(id.as_str())?;
        Self::from_segments(id.clone(), segments)
    }

    fn from_segments(id: PropertyId, segments: Vec<Segment>) -> Result<Self, PropertyIdError> {
        let mut pattern = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Capture { .. } => pattern.push_str(r"(\S*)"),
            }
        }
        pattern.push('$');
        let pattern = Regex::new(&pattern).map_err(|e| PropertyIdError::Pattern { id: id.to_string(), message: e.to_string() })?;
        Ok(Self { id, segments, pattern })
    }

    pub fn id(&self) -> &PropertyId { &self.id }

    /// Match a concrete id, returning the captured groups positionally
    pub fn matches(&self, id: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(id)?;
        Some(captures.iter().skip(1).map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default()).collect())
    }

    pub fn is_match(&self, id: &str) -> bool { self.pattern.is_match(id) }

    /// Substitute arguments into the template. `args[N-1]` fills capture `$N`; captures with no
    /// argument are left as `$N`.
    pub fn instantiate<S: AsRef<str>>(&self, args: &[S]) -> PropertyId {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Capture { index, transform } => match args.get(index - 1) {
                    Some(arg) => out.push_str(&transform.apply(arg.as_ref())),
                    None => {
                        out.push('$');
                        out.push_str(&index.to_string());
                    }
                },
            }
        }
        PropertyId::new(out)
    }

    /// Template of the parent category, split on the last separator of a literal segment
    pub fn category(&self) -> Option<PropertyTemplate> {
        let (seg_idx, byte_idx) =
            self.segments.iter().enumerate().rev().find_map(|(i, segment)| match segment {
                Segment::Literal(text) => text.rfind(SEPARATOR).map(|b| (i, b)),
                Segment::Capture { .. } => None,
            })?;
        let mut segments: Vec<Segment> = self.segments[..seg_idx].to_vec();
        if let Segment::Literal(text) = &self.segments[seg_idx] {
            if byte_idx > 0 {
                segments.push(Segment::Literal(text[..byte_idx].to_string()));
            }
        }
        if segments.is_empty() {
            return None;
        }
        let id = PropertyId::new(render(&segments));
        Self::from_segments(id, segments).ok()
    }
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Capture { index, transform } => {
                out.push('$');
                out.push_str(&index.to_string());
                out.push_str(transform.directive());
            }
        }
    }
    out
}

const REPLACE_ALL: &str = ".replaceAll(";

fn parse_segments(id: &str) -> Result<Vec<Segment>, PropertyIdError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = id;

    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            literal.push_str(&rest[..pos + 1]);
            rest = after;
            continue;
        }
        literal.push_str(&rest[..pos]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        let index: usize = after[..digits].parse().map_err(|_| PropertyIdError::InvalidCapture(id.to_string()))?;
        if index == 0 {
            return Err(PropertyIdError::InvalidCapture(id.to_string()));
        }
        rest = &after[digits..];

        let transform = if rest.starts_with(REPLACE_ALL) {
            let (args, consumed) = directive_arguments(&rest[REPLACE_ALL.len()..])
                .ok_or_else(|| PropertyIdError::UnsupportedTransform { id: id.to_string(), directive: rest.to_string() })?;
            let directive = &rest[..REPLACE_ALL.len() + consumed];
            let transform = match args.as_slice() {
                [pattern, replacement] => CaptureTransform::from_replace_all(pattern, replacement),
                _ => None,
            };
            let transform = transform
                .ok_or_else(|| PropertyIdError::UnsupportedTransform { id: id.to_string(), directive: directive.to_string() })?;
            rest = &rest[REPLACE_ALL.len() + consumed..];
            transform
        } else if is_method_call(rest) {
            let end = rest.find(')').map(|i| i + 1).unwrap_or(rest.len());
            return Err(PropertyIdError::UnsupportedTransform { id: id.to_string(), directive: rest[..end].to_string() });
        } else {
            CaptureTransform::Verbatim
        };
        segments.push(Segment::Capture { index, transform });
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    if segments.is_empty() {
        return Err(PropertyIdError::Empty);
    }
    Ok(segments)
}

/// `.name(` directly after a capture
fn is_method_call(rest: &str) -> bool {
    let Some(tail) = rest.strip_prefix('.') else { return false };
    let name_len = tail.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    name_len > 0 && tail[name_len..].starts_with('(')
}

/// Read the quoted arguments of a directive up to its closing parenthesis.
/// Returns the unquoted arguments and the number of bytes consumed, including the `)`.
fn directive_arguments(input: &str) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut chars = input.char_indices();
    loop {
        let (_, c) = chars.next()?;
        match c {
            '"' => {
                let mut arg = String::new();
                loop {
                    let (_, c) = chars.next()?;
                    if c == '"' {
                        break;
                    }
                    arg.push(c);
                }
                args.push(arg);
            }
            ',' | ' ' => {}
            ')' => {
                let consumed = chars.next().map(|(i, _)| i).unwrap_or(input.len());
                return Some((args, consumed));
            }
            _ => return None,
        }
    }
}
