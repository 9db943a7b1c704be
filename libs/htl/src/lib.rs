//! Composable HTML template fragments with lazy rendering, in-place
//! pattern rewriting, chunked streaming, and self-updating "live"
//! elements.

pub mod chunks;
pub mod hexid;
pub mod live;
pub mod script;
pub mod tpl;

pub use chunks::{ChunkReader, Chunks};
pub use live::{Fetch, LiveConfig, LiveElement, ResponseMode, UpdateTarget};
pub use script::{js_str, JsFn};
pub use tpl::{ApplyScope, Tpl, TplBuilder, Value};

/// Escape text for inclusion in HTML element or attribute content.
/// Template holes insert values verbatim; run caller-supplied text
/// through this first.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[test]
fn t_html_escape() {
    assert_eq!(html_escape("a < b & c"), "a &lt; b &amp; c");
    assert_eq!(html_escape("\"quoted\" 'single'"),
               "&quot;quoted&quot; &#39;single&#39;");
    assert_eq!(html_escape("plain"), "plain");
}
