//! Templated fragments: literal text segments interleaved with values.
//!
//! A template keeps its holes open after construction: individual
//! segments and values can be replaced, patterns can be rewritten
//! across the whole tree, and stringification happens only on demand.

use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use regex::Regex;

use crate::chunks::{ChunkReader, Chunks};

/// One hole in a template.
///
/// Nested `Tpl` values are shared by reference: mutating one mutates
/// it in every template that contains it. `List` covers the mapped
/// list case (a sequence of fragments pre-joined into one slot).
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Str(String),
    Tpl(Tpl),
    List(Vec<Value>),
}

impl Value {
    fn print_text(&self, out: &mut String) {
        match self {
            Value::None => (),
            Value::Str(s) => out.push_str(s),
            Value::Tpl(tpl) => tpl.print_text(out),
            Value::List(values) => {
                for value in values {
                    value.print_text(out);
                }
            }
        }
    }

    /// The text form of just this value, `""` for `None`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.print_text(&mut out);
        out
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
impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}
impl From<kstring::KString> for Value {
    fn from(s: kstring::KString) -> Self {
        Value::Str(s.as_str().to_string())
    }
}
impl From<&kstring::KString> for Value {
    fn from(s: &kstring::KString) -> Self {
        Value::Str(s.as_str().to_string())
    }
}
impl From<Tpl> for Value {
    fn from(tpl: Tpl) -> Self {
        Value::Tpl(tpl)
    }
}
impl From<&Tpl> for Value {
    fn from(tpl: &Tpl) -> Self {
        Value::Tpl(tpl.clone())
    }
}
impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}
impl From<Vec<Tpl>> for Value {
    fn from(tpls: Vec<Tpl>) -> Self {
        Value::List(tpls.into_iter().map(Value::Tpl).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::None,
        }
    }
}

macro_rules! value_from_display {
    { $($t:ty),* } => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Str(v.to_string())
            }
        })*
    }
}
value_from_display! { i32, i64, u32, u64, usize, f64, bool }

#[derive(Debug)]
struct TplNode {
    segments: Vec<String>,
    values: Vec<Value>,
}

/// A shared handle to a template node. `clone()` clones the handle,
/// not the node: two handles see each other's mutations.
#[derive(Debug, Clone)]
pub struct Tpl(Arc<Mutex<TplNode>>);

/// What `Tpl::apply` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyScope {
    Segments,
    SegmentsAndValues,
}

/// One step of the interleaved segment/value walk, for cursors.
pub(crate) enum Step {
    Segment(String),
    Value(Value),
    Done,
}

impl Tpl {
    /// `segments` must be exactly one longer than `values`; violating
    /// that is a bug in the caller, not a recoverable condition.
    pub fn new(segments: Vec<String>, values: Vec<Value>) -> Result<Tpl> {
        if segments.len() != values.len() + 1 {
            bail!(
                "template shape violated: {} segments for {} values",
                segments.len(),
                values.len()
            );
        }
        Ok(Tpl(Arc::new(Mutex::new(TplNode { segments, values }))))
    }

    /// A template holding a single literal, no holes.
    pub fn lit(text: impl Into<String>) -> Tpl {
        Tpl(Arc::new(Mutex::new(TplNode {
            segments: vec![text.into()],
            values: Vec::new(),
        })))
    }

    fn node(&self) -> MutexGuard<'_, TplNode> {
        self.0.lock().expect("template lock never poisoned")
    }

    pub fn num_values(&self) -> usize {
        self.node().values.len()
    }

    pub fn segment_at(&self, index: usize) -> Result<String> {
        self.node()
            .segments
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("segment index {index} out of range"))
    }

    pub fn value_at(&self, index: usize) -> Result<Value> {
        self.node()
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("value index {index} out of range"))
    }

    pub fn update_segment_at(&self, index: usize, segment: impl Into<String>) -> Result<()> {
        let mut node = self.node();
        let slot = node
            .segments
            .get_mut(index)
            .ok_or_else(|| anyhow!("segment index {index} out of range"))?;
        *slot = segment.into();
        Ok(())
    }

    pub fn update_value_at(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let mut node = self.node();
        let slot = node
            .values
            .get_mut(index)
            .ok_or_else(|| anyhow!("value index {index} out of range"))?;
        *slot = value.into();
        Ok(())
    }

    /// Apply `f` to every segment, and with `SegmentsAndValues` to
    /// every plain-text value as well. Nested templates and lists are
    /// left alone.
    pub fn apply<F: Fn(&str) -> String>(&self, f: F, scope: ApplyScope) {
        let mut node = self.node();
        let node = &mut *node;
        for segment in node.segments.iter_mut() {
            *segment = f(segment);
        }
        if scope == ApplyScope::SegmentsAndValues {
            for value in node.values.iter_mut() {
                if let Value::Str(s) = value {
                    *s = f(s);
                }
            }
        }
    }

    /// Replace all matches of `pattern` with `replacement` in every
    /// segment, and with `also_values` in text values too. A nested
    /// template value is either collapsed to rewritten plain text
    /// (`flatten`, giving up its structure for good) or rewritten
    /// recursively, keeping it editable. Other values pass through.
    pub fn rewrite(&self, pattern: &Regex, replacement: &str, also_values: bool, flatten: bool) {
        let mut node = self.node();
        let node = &mut *node;
        for segment in node.segments.iter_mut() {
            if let Some(replaced) = replace_all(segment, pattern, replacement) {
                *segment = replaced;
            }
        }
        if !also_values {
            return;
        }
        for value in node.values.iter_mut() {
            match value {
                Value::Str(s) => {
                    if let Some(replaced) = replace_all(s, pattern, replacement) {
                        *s = replaced;
                    }
                }
                Value::Tpl(tpl) => {
                    if flatten {
                        let rendered = tpl.to_text();
                        let replaced = replace_all(&rendered, pattern, replacement)
                            .unwrap_or(rendered);
                        *value = Value::Str(replaced);
                    } else {
                        tpl.rewrite(pattern, replacement, also_values, flatten);
                    }
                }
                Value::None | Value::List(_) => (),
            }
        }
    }

    fn print_text(&self, out: &mut String) {
        let node = self.node();
        for (i, segment) in node.segments.iter().enumerate() {
            out.push_str(segment);
            if let Some(value) = node.values.get(i) {
                value.print_text(out);
            }
        }
    }

    /// Render the whole tree to a string. Idempotent as long as no
    /// mutation happens in between.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.print_text(&mut out);
        out
    }

    /// A fresh, independent cursor over the template's text chunks.
    /// Cursors never share state; traversing twice yields the same
    /// sequence on an unmodified template.
    pub fn chunks(&self) -> Chunks {
        Chunks::new(self.clone())
    }

    /// The chunk sequence as an `std::io::Read`, for handing the
    /// template to a transport without rendering it up front.
    pub fn chunk_reader(&self) -> ChunkReader {
        ChunkReader::new(Chunks::new(self.clone()))
    }

    pub(crate) fn step(&self, pos: usize) -> Step {
        let node = self.node();
        let i = pos / 2;
        if pos % 2 == 0 {
            match node.segments.get(i) {
                Some(segment) => Step::Segment(segment.clone()),
                None => Step::Done,
            }
        } else {
            match node.values.get(i) {
                Some(value) => Step::Value(value.clone()),
                None => Step::Done,
            }
        }
    }
}

impl Display for Tpl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn replace_all(text: &str, pattern: &Regex, replacement: &str) -> Option<String> {
    use std::borrow::Cow;
    match pattern.replace_all(text, replacement) {
        Cow::Borrowed(_) => None,
        Cow::Owned(replaced) => Some(replaced),
    }
}

/// Incremental construction with the shape invariant maintained for
/// the caller: consecutive literals merge, missing segments between
/// and around values become empty ones.
#[derive(Debug, Default)]
pub struct TplBuilder {
    segments: Vec<String>,
    values: Vec<Value>,
}

impl TplBuilder {
    pub fn new() -> TplBuilder {
        TplBuilder::default()
    }

    pub fn lit(mut self, text: impl AsRef<str>) -> TplBuilder {
        if self.segments.len() == self.values.len() + 1 {
            self.segments
                .last_mut()
                .expect("nonempty by the length check")
                .push_str(text.as_ref());
        } else {
            self.segments.push(text.as_ref().to_string());
        }
        self
    }

    pub fn val(mut self, value: impl Into<Value>) -> TplBuilder {
        if self.segments.len() == self.values.len() {
            self.segments.push(String::new());
        }
        self.values.push(value.into());
        self
    }

    pub fn build(mut self) -> Tpl {
        if self.segments.len() == self.values.len() {
            self.segments.push(String::new());
        }
        Tpl::new(self.segments, self.values).expect("builder keeps the shape invariant")
    }
}

/// Literal-with-holes construction:
/// `tpl!("<p>" {name} "</p>")`. String literals become segments,
/// `{expr}` parts become values via `Into<Value>`.
#[macro_export]
macro_rules! tpl {
    (@part $b:ident $lit:literal) => { $b.lit($lit) };
    (@part $b:ident { $e:expr }) => { $b.val($e) };
    ($($part:tt)*) => {{
        let b = $crate::tpl::TplBuilder::new();
        $(let b = $crate::tpl!(@part b $part);)*
        b.build()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn t_interleave() {
        let t = Tpl::new(
            segs(&["a", "b", "c"]),
            vec![Value::from("1"), Value::from(2)],
        )
        .unwrap();
        assert_eq!(t.to_text(), "a1b2c");
        assert_eq!(t.to_text(), "a1b2c"); // unchanged without mutation
        assert_eq!(format!("{t}"), "a1b2c");
    }

    #[test]
    fn t_shape_checked() {
        assert!(Tpl::new(segs(&["a"]), vec![Value::from("x")]).is_err());
        assert!(Tpl::new(segs(&["a", "b"]), vec![]).is_err());
        assert_eq!(Tpl::lit("just text").to_text(), "just text");
    }

    #[test]
    fn t_none_and_lists() {
        let t = Tpl::new(
            segs(&["<ul>", "</ul>", ""]),
            vec![
                Value::List(vec![Value::from("<li>a</li>"), Value::from("<li>b</li>")]),
                Value::None,
            ],
        )
        .unwrap();
        assert_eq!(t.to_text(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn t_nesting() {
        let inner = Tpl::new(segs(&["x"]), vec![]).unwrap();
        let outer = Tpl::new(segs(&["", "y"]), vec![Value::from(&inner)]).unwrap();
        assert_eq!(outer.to_text(), "xy");
    }

    #[test]
    fn t_shared_reference_mutation() {
        let shared = tpl!("shared " {1});
        let a = tpl!("A: " {&shared});
        let b = tpl!("B: " {&shared});
        shared.update_value_at(0, 2).unwrap();
        assert_eq!(a.to_text(), "A: shared 2");
        assert_eq!(b.to_text(), "B: shared 2");
    }

    #[test]
    fn t_update_at() {
        let t = tpl!("a" {"1"} "b");
        t.update_segment_at(1, "B").unwrap();
        t.update_value_at(0, "one").unwrap();
        assert_eq!(t.to_text(), "aoneB");
        assert!(t.update_segment_at(2, "nope").is_err());
        assert!(t.update_value_at(1, "nope").is_err());
    }

    #[test]
    fn t_apply_scopes() {
        let t = tpl!("ab" {"cd"} "ef");
        t.apply(|s| s.to_uppercase(), ApplyScope::Segments);
        assert_eq!(t.to_text(), "ABcdEF");
        t.apply(|s| s.to_lowercase(), ApplyScope::SegmentsAndValues);
        assert_eq!(t.to_text(), "abcdef");
    }

    #[test]
    fn t_rewrite_segments_only() {
        let re = Regex::new(r"\{\{NONCE\}\}").unwrap();
        let t = tpl!("n={{NONCE}} " {"v={{NONCE}}"});
        t.rewrite(&re, "42", false, true);
        assert_eq!(t.to_text(), "n=42 v={{NONCE}}");
    }

    #[test]
    fn t_rewrite_replaces_all_matches() {
        let re = Regex::new("o").unwrap();
        let t = tpl!("foo boo" {"mono"});
        t.rewrite(&re, "0", true, true);
        assert_eq!(t.to_text(), "f00 b00m0n0");
    }

    #[test]
    fn t_rewrite_flatten_is_permanent() {
        let re = Regex::new(r"\{\{NONCE\}\}").unwrap();
        let inner = tpl!("<script nonce=\"{{NONCE}}\"></script>");
        let outer = tpl!("<head>" {&inner} "</head>");
        outer.rewrite(&re, "first", true, true);
        assert_eq!(
            outer.to_text(),
            "<head><script nonce=\"first\"></script></head>"
        );
        // The slot is plain text now; rewriting the inner node no
        // longer has any effect on the outer document.
        inner.rewrite(&re, "second", true, true);
        assert_eq!(
            outer.to_text(),
            "<head><script nonce=\"first\"></script></head>"
        );
        match outer.value_at(0).unwrap() {
            Value::Str(_) => (),
            other => panic!("expected flattened text, got {other:?}"),
        }
    }

    #[test]
    fn t_rewrite_recursive_keeps_structure() {
        let re = Regex::new("X").unwrap();
        let inner = tpl!("aXb");
        let outer = tpl!("[" {&inner} "]");
        outer.rewrite(&re, "Y", true, false);
        assert_eq!(outer.to_text(), "[aYb]");
        match outer.value_at(0).unwrap() {
            Value::Tpl(tpl) => assert_eq!(tpl.to_text(), "aYb"),
            other => panic!("expected nested template, got {other:?}"),
        }
        // Still independently re-renderable and editable.
        inner.update_segment_at(0, "aZb").unwrap();
        assert_eq!(outer.to_text(), "[aZb]");
    }

    #[test]
    fn t_rewrite_no_match_is_noop() {
        let re = Regex::new("zzz").unwrap();
        let t = tpl!("abc" {"def"});
        t.rewrite(&re, "!", true, true);
        assert_eq!(t.to_text(), "abcdef");
    }

    #[test]
    fn t_builder_normalizes() {
        let t = TplBuilder::new()
            .val("a")
            .val("b")
            .lit("c")
            .lit("d")
            .build();
        assert_eq!(t.to_text(), "abcd");
        assert_eq!(t.num_values(), 2);
        assert_eq!(t.segment_at(0).unwrap(), "");
        assert_eq!(t.segment_at(1).unwrap(), "");
        assert_eq!(t.segment_at(2).unwrap(), "cd");
    }

    #[test]
    fn t_tpl_macro() {
        let name = "world";
        let t = tpl!("<p>Hello, " {name} "!</p>");
        assert_eq!(t.to_text(), "<p>Hello, world!</p>");
        assert_eq!(tpl!().to_text(), "");
        assert_eq!(tpl!({1} {2} {3}).to_text(), "123");
        let opt: Option<&str> = None;
        assert_eq!(tpl!("a" {opt} "b").to_text(), "ab");
    }
}
