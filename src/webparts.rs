//! Components making up the demo site.
//!
//! Every page is a template fragment with its holes kept open until
//! the route sends it; user-supplied text goes through `html_escape`
//! on the way in.

use std::sync::Arc;

use htl::live::Fetch;
use htl::{html_escape, js_str, tpl, JsFn, LiveConfig, LiveElement, ResponseMode, Tpl, Value};
use kstring::KString;

use crate::articles::{Article, Comment};
use crate::style::style;

pub fn head(title: &str) -> Tpl {
    tpl!(
        "<head>\n<meta charset=\"utf-8\"/>\n<meta name=\"viewport\" \
         content=\"width=device-width, initial-scale=1.0\"/>\n<title>"
        {html_escape(title)} "</title>\n" {style()} "\n</head>"
    )
}

fn badge(href: &str, text: &str) -> Tpl {
    tpl!("<a href=\"" {href} "\"><span class=\"card\">" {text} "</span></a>")
}

pub fn navigation() -> Tpl {
    tpl!("<p>"
         {vec![badge("/blogs", "blogs"),
               badge("/live", "live"),
               badge("/sample/Friend", "sample")]}
         "</p>")
}

pub fn home_page(name: &str, is_new_visitor: bool) -> Tpl {
    let welcome = if is_new_visitor {
        Value::from(tpl!("<p class=\"welcome\">Welcome! Looks like your first visit.</p>"))
    } else {
        Value::None
    };
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n" {head("Home")} "\n<body>\n<h1>Hello, "
        {html_escape(name)} "!</h1>\n" {welcome}
        "\n<h2>What is this?</h2>\n<p>A small site whose pages are template \
         fragments with the holes kept open: they render lazily, stream in \
         chunks, and can rewrite themselves before going out. The live page \
         carries widgets that keep themselves current.</p>\n"
        {navigation()} "\n</body>\n</html>"
    )
}

fn article_card(article: &Article) -> Tpl {
    tpl!(
        "<a href=\"/blogs/" {article.id} "\"><div class=\"card\"><strong>"
        {html_escape(article.title.as_str())} "</strong><br/><span>~ "
        {html_escape(article.author.as_str())} ", "
        {article.publish_date.format("%Y-%m-%d").to_string()}
        "</span></div></a>"
    )
}

pub fn blogs_page(articles: &[Article]) -> Tpl {
    let cards: Vec<Tpl> = articles.iter().map(article_card).collect();
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n" {head("Blogs")} "\n<body>\n"
        "<p><a href=\"/\">← Back home</a></p>\n<h1>/blogs</h1>\n"
        {cards} "\n" {navigation()} "\n</body>\n</html>"
    )
}

fn comment_card(comment: &Comment) -> Tpl {
    tpl!(
        "<div class=\"card\"><strong>" {html_escape(comment.author.as_str())}
        "</strong><br/><em>" {html_escape(comment.email.as_str())} "</em><br/>"
        {html_escape(comment.body.as_str())} "</div>"
    )
}

pub fn article_page(article: &Article, comments: &[Comment]) -> Tpl {
    let comment_cards: Vec<Tpl> = comments.iter().map(comment_card).collect();
    let comments_value = if comment_cards.is_empty() {
        Value::from("<p>No comments yet.</p>")
    } else {
        Value::from(comment_cards)
    };
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n" {head(article.title.as_str())}
        "\n<body>\n<p><a href=\"/blogs\">← All posts</a></p>\n<h1>"
        {html_escape(article.title.as_str())} "</h1>\n<h2>~ "
        {html_escape(article.author.as_str())} ", "
        {article.publish_date.format("%Y-%m-%d").to_string()} "</h2>\n<div class=\"card\">"
        {html_escape(article.content.as_str())} "</div>\n<h2>Comments</h2>\n"
        {comments_value}
        "\n<form class=\"comment\" method=\"POST\" action=\"/blogs/" {article.id}
        "/comments\">\n<input name=\"author\" placeholder=\"name\" required/>\n\
         <input name=\"email\" placeholder=\"email\" required/>\n\
         <textarea name=\"body\" placeholder=\"what do you think?\" required></textarea>\n\
         <button>Post comment</button>\n</form>\n"
        {navigation()} "\n</body>\n</html>"
    )
}

pub fn error_page(title: &str, message: &str) -> Tpl {
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n" {head("Error")} "\n<body>\n"
        "<p><a href=\"/\">← Back home</a></p>\n<h1>" {html_escape(title)}
        "</h1>\n<h3>" {html_escape(message)} "</h3>\n</body>\n</html>"
    )
}

const COMMENT_FEED_HANDLER: &str = r#"var c = data[Math.floor(Math.random() * data.length)];
if (!c) return null;
return "<div class=\"card\"><strong>" + c.author + "</strong><br/><em>"
  + c.email + "</em><br/>" + c.body + "</div>";"#;

/// Shows a random comment, refreshed every two seconds.
pub fn comment_feed(api_url: &str) -> LiveElement {
    LiveElement::new(LiveConfig {
        attrs: vec![(KString::from_static("class"), KString::from_static("live-box"))],
        initial: KString::from_static("<p class=\"card\">Loading comments…</p>"),
        interval_ms: 2000,
        response_mode: ResponseMode::Json,
        ..LiveConfig::new("div", api_url, JsFn::new("data", COMMENT_FEED_HANDLER))
    })
}

const LATEST_COMMENT_HANDLER: &str = r#"return "<div class=\"card\"><strong>" + data.author
  + "</strong> on post " + data.article_id + "<br/>" + data.body + "</div>";"#;

/// Shows one comment and already carries it in the first response:
/// the first fetch happens on the server, rendered by the handler's
/// server-side counterpart.
pub fn latest_comment(api_url: &str) -> LiveElement {
    LiveElement::new(LiveConfig {
        attrs: vec![(KString::from_static("class"), KString::from_static("live-box"))],
        initial: KString::from_static("<p class=\"card\">No comment yet.</p>"),
        interval_ms: 5000,
        response_mode: ResponseMode::Json,
        eager_first_fetch: true,
        server_render: Some(Arc::new(|payload: &str| -> anyhow::Result<String> {
            let c: serde_json::Value = serde_json::from_str(payload)?;
            Ok(format!(
                "<div class=\"card\"><strong>{}</strong> on post {}<br/>{}</div>",
                html_escape(c["author"].as_str().unwrap_or("")),
                c["article_id"].as_u64().unwrap_or(0),
                html_escape(c["body"].as_str().unwrap_or("")),
            ))
        })),
        ..LiveConfig::new("div", api_url, JsFn::new("data", LATEST_COMMENT_HANDLER))
    })
}

pub fn live_page(api_base: &str, fetcher: Option<&dyn Fetch>) -> Tpl {
    let feed = comment_feed(&format!("{api_base}/api/comments"));
    let feed_clone = feed.clone_element();
    let latest = latest_comment(&format!("{api_base}/api/data"));
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n" {head("Live elements")} "\n<body>\n"
        "<p><a href=\"/\">← Back home</a></p>\n<h1>Live elements</h1>\n"
        "<p>These update on their own by polling the comment API.</p>\n"
        "<h2>Live comment feed</h2>\n" {feed.render(fetcher)}
        "\n<h2>The same widget, cloned</h2>\n" {feed_clone.render(fetcher)}
        "\n<h2>Latest comment, fetched before first paint</h2>\n" {latest.render(fetcher)}
        "\n" {navigation()} "\n</body>\n</html>"
    )
}

pub fn sample_page(name: &str) -> Tpl {
    let script = tpl!(
        "<script nonce=\"{{NONCE}}\">\nconsole.log(" {js_str(name)} ");\n</script>"
    );
    tpl!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta http-equiv=\"Content-Security-Policy\" \
         content=\"script-src 'nonce-{{NONCE}}'\"/>\n\
         <title>Inline scripts under CSP</title>\n"
        {style()} "\n</head>\n<body>\n<h1>Hello, " {html_escape(name)} "</h1>\n"
        "<p>Every inline script and style on this page carries a per-request \
         nonce. The page is written once with a placeholder; the route stamps \
         the real value into every fragment, nested ones included, right \
         before sending.</p>\n"
        {script} "\n" {navigation()} "\n</body>\n</html>"
    )
}
