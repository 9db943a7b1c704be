//! Client-side handler logic represented as data.
//!
//! A handler cannot be a Rust closure: its executable form travels as
//! literal source text inside the generated document and is re-parsed
//! by the browser, in a context that shares nothing with the process
//! that defined it. So it is text from the start.

use std::fmt::{self, Display};

use kstring::KString;

/// A self-contained script function: parameter name plus body source.
///
/// At execution time the body can reach its own parameter, the `el`
/// binding provided by the emitting wrapper, and browser globals.
/// Anything else is a contract violation that only surfaces in the
/// browser console.
#[derive(Debug, Clone)]
pub struct JsFn {
    param: KString,
    body: KString,
}

impl JsFn {
    pub fn new(param: &str, body: &str) -> JsFn {
        JsFn {
            param: KString::from_ref(param),
            body: KString::from_ref(body),
        }
    }

    /// A handler that just evaluates to `expr`.
    pub fn returning(param: &str, expr: &str) -> JsFn {
        JsFn {
            param: KString::from_ref(param),
            body: KString::from_string(format!("return ({expr});")),
        }
    }

    pub fn param(&self) -> &str {
        self.param.as_str()
    }

    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// The deterministic source-text form embedded into output.
    pub fn to_js(&self) -> String {
        format!("function({}) {{\n{}\n}}", self.param, self.body)
    }
}

impl Display for JsFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_js())
    }
}

/// `s` as a double-quoted JS string literal, safe to embed in an
/// inline script block: `<` is escaped so the literal can never
/// contain a terminating `</script>`.
pub fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
