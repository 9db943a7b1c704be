//! Self-updating elements: a markup fragment plus an inlined script
//! that keeps the element's content current by polling a URL.
//!
//! Updates are id-scoped: every emitted script looks its own element
//! up by id and writes to it directly, so any number of elements
//! (including clones of one configuration) coexist on a page with no
//! shared state. Once emitted, a repeating timer runs for the
//! lifetime of the page; there is no teardown hook.

use std::sync::Arc;

use anyhow::{bail, Result};
use kstring::KString;

use crate::hexid::{hex_succ, random_id};
use crate::script::{js_str, JsFn};

/// How the client parses a poll response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Text,
    Json,
}

/// Which part of the element a handler result replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    Markup,
    Text,
}

/// Server-side stand-in for the client handler. The client handler is
/// script source and cannot run in this process; when the first fetch
/// happens eagerly on the server, this renders its payload instead.
pub type ServerRender = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// Performs the eager first fetch. Implementations must treat
/// non-success statuses as errors.
pub trait Fetch {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct LiveConfig {
    pub tag: KString,
    pub attrs: Vec<(KString, KString)>,
    /// Content shown until the first update arrives.
    pub initial: KString,
    pub request_url: KString,
    /// 0 means fetch exactly once after a zero delay; anything above
    /// repeats at that period, indefinitely.
    pub interval_ms: u64,
    pub handler: JsFn,
    pub response_mode: ResponseMode,
    pub update_target: UpdateTarget,
    /// Perform the first fetch on the server, before rendering; falls
    /// back to `initial` when it fails.
    pub eager_first_fetch: bool,
    pub server_render: Option<ServerRender>,
}

impl LiveConfig {
    /// The common shape; adjust the remaining fields via struct
    /// update syntax.
    pub fn new(tag: &str, request_url: &str, handler: JsFn) -> LiveConfig {
        LiveConfig {
            tag: KString::from_ref(tag),
            attrs: Vec::new(),
            initial: KString::from_static(""),
            request_url: KString::from_ref(request_url),
            interval_ms: 1000,
            handler,
            response_mode: ResponseMode::Text,
            update_target: UpdateTarget::Markup,
            eager_first_fetch: false,
            server_render: None,
        }
    }
}

pub struct LiveElement {
    config: LiveConfig,
    id: KString,
}

impl LiveElement {
    /// No validation happens here beyond id derivation: a
    /// caller-supplied `id` attribute wins, otherwise a random one is
    /// generated and stored into the attributes.
    pub fn new(mut config: LiveConfig) -> LiveElement {
        let id = match config.attrs.iter().find(|(k, _)| k.as_str() == "id") {
            Some((_, v)) => v.clone(),
            None => {
                let id = KString::from_string(
                    random_id().expect("entropy source available"));
                config.attrs.push((KString::from_static("id"), id.clone()));
                id
            }
        };
        LiveElement { config, id }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn attrs(&self) -> &[(KString, KString)] {
        &self.config.attrs
    }

    /// A sibling element: same handler, URL, interval and modes (all
    /// shared), shallow-copied attributes, and the next id in hex
    /// order so both can live on one page. A non-derivable id (a
    /// caller-supplied token that is not hex) falls back to a fresh
    /// random one.
    pub fn clone_element(&self) -> LiveElement {
        let id = match hex_succ(self.id.as_str()) {
            Some(next) => next,
            None => {
                eprintln!(
                    "live element {:?}: id not derivable, using a fresh one",
                    self.id
                );
                random_id().expect("entropy source available")
            }
        };
        let id = KString::from_string(id);
        let mut config = self.config.clone();
        for (key, value) in config.attrs.iter_mut() {
            if key.as_str() == "id" {
                *value = id.clone();
            }
        }
        LiveElement { config, id }
    }

    fn render_attrs(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.config.attrs {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(key.as_str());
            out.push_str("=\"");
            out.push_str(&value.as_str().replace('"', "&quot;"));
            out.push('"');
        }
        out
    }

    fn eager_fetch(&self, fetcher: Option<&dyn Fetch>) -> Result<Option<String>> {
        let fetcher = match fetcher {
            Some(f) => f,
            None => bail!("no fetcher supplied"),
        };
        let payload = fetcher.fetch_text(self.config.request_url.as_str())?;
        match &self.config.server_render {
            Some(render) => Ok(Some(render(&payload)?)),
            None => match self.config.update_target {
                // A markup payload can stand in for the handler
                // output directly; a text payload cannot be placed
                // without one, so keep the configured content.
                UpdateTarget::Markup => Ok(Some(payload)),
                UpdateTarget::Text => Ok(None),
            },
        }
    }

    fn initial_body(&self, fetcher: Option<&dyn Fetch>) -> KString {
        if self.config.eager_first_fetch {
            match self.eager_fetch(fetcher) {
                Ok(Some(body)) => return KString::from_string(body),
                Ok(None) => (),
                Err(e) => eprintln!(
                    "live element {:?}: eager fetch failed, \
                     keeping initial content: {e:#}",
                    self.id
                ),
            }
        }
        self.config.initial.clone()
    }

    /// The element plus its update script. Never fails: the only
    /// fallible part, the eager first fetch, falls back to the
    /// configured initial content.
    pub fn render(&self, fetcher: Option<&dyn Fetch>) -> String {
        let attrs = self.render_attrs();
        let body = self.initial_body(fetcher);
        let tag = self.config.tag.as_str();
        let id_js = js_str(self.id.as_str());
        let url_js = js_str(self.config.request_url.as_str());
        let parse = match self.config.response_mode {
            ResponseMode::Text => "text",
            ResponseMode::Json => "json",
        };
        let assign = match self.config.update_target {
            UpdateTarget::Markup => "el.innerHTML = out;",
            UpdateTarget::Text => "el.textContent = out;",
        };
        let timer = if self.config.interval_ms > 0 {
            format!("setInterval(tick, {});", self.config.interval_ms)
        } else {
            "setTimeout(tick, 0);".to_string()
        };
        format!(
            "<{tag} {attrs}>{body}</{tag}>\n\
             <script>(function(){{\n\
             var el = document.getElementById({id_js});if(!el)return;\n\
             var render = {handler};\n\
             var tick = function(){{\n\
             fetch({url_js}).then(function(res){{\n\
             if(!res.ok)throw new Error(\"HTTP \" + res.status);\n\
             return res.{parse}();\n\
             }}).then(function(data){{\n\
             var out = render(data);\n\
             if(out !== undefined && out !== null){{{assign}}}\n\
             }}).catch(function(e){{console.error(\"live element \" + {id_js}, e);}});\n\
             }};\n\
             {timer}\n\
             }})();</script>",
            handler = self.config.handler.to_js(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LiveConfig {
        LiveConfig {
            attrs: vec![(KString::from_static("id"), KString::from_static("abc"))],
            initial: KString::from_static("loading"),
            interval_ms: 2000,
            response_mode: ResponseMode::Json,
            ..LiveConfig::new("div", "https://x/y", JsFn::returning("data", "data.body"))
        }
    }

    #[test]
    fn t_end_to_end_render() {
        let el = LiveElement::new(config());
        let out = el.render(None);
        assert!(out.starts_with("<div id=\"abc\">loading</div>"));
        assert!(out.contains("document.getElementById(\"abc\")"));
        assert!(out.contains("fetch(\"https://x/y\")"));
        assert!(out.contains("setInterval(tick, 2000);"));
        assert!(out.contains("res.json()"));
        assert!(out.contains("el.innerHTML = out;"));
        assert!(out.contains("function(data) {"));
        assert!(out.ends_with("</script>"));
    }

    #[test]
    fn t_one_shot_timer() {
        let el = LiveElement::new(LiveConfig {
            interval_ms: 0,
            ..config()
        });
        let out = el.render(None);
        assert!(out.contains("setTimeout(tick, 0);"));
        assert!(!out.contains("setInterval"));
    }

    #[test]
    fn t_text_target_and_mode() {
        let el = LiveElement::new(LiveConfig {
            response_mode: ResponseMode::Text,
            update_target: UpdateTarget::Text,
            ..config()
        });
        let out = el.render(None);
        assert!(out.contains("res.text()"));
        assert!(out.contains("el.textContent = out;"));
    }

    #[test]
    fn t_generated_id() {
        let el = LiveElement::new(LiveConfig {
            attrs: Vec::new(),
            ..config()
        });
        assert_eq!(el.id().len(), crate::hexid::ID_LEN);
        assert!(el.id().chars().all(|c| c.is_ascii_hexdigit()));
        // The id is also a rendered attribute.
        assert!(el
            .render(None)
            .contains(&format!("id=\"{}\"", el.id())));
    }

    #[test]
    fn t_attr_escaping() {
        let el = LiveElement::new(LiveConfig {
            attrs: vec![
                (KString::from_static("id"), KString::from_static("abc")),
                (
                    KString::from_static("data-x"),
                    KString::from_static("say \"hi\""),
                ),
            ],
            ..config()
        });
        assert!(el
            .render(None)
            .contains("data-x=\"say &quot;hi&quot;\""));
    }

    #[test]
    fn t_clone_derives_id() {
        let el = LiveElement::new(LiveConfig {
            attrs: vec![(KString::from_static("id"), KString::from_static("0009"))],
            ..config()
        });
        let sibling = el.clone_element();
        assert_eq!(sibling.id(), "000a");
        assert_eq!(el.id(), "0009"); // original untouched
        assert!(sibling.render(None).contains("id=\"000a\""));

        let el = LiveElement::new(LiveConfig {
            attrs: vec![(KString::from_static("id"), KString::from_static("00ff"))],
            ..config()
        });
        assert_eq!(el.clone_element().id(), "0100");
    }

    #[test]
    fn t_clone_of_non_hex_id() {
        let el = LiveElement::new(LiveConfig {
            attrs: vec![(KString::from_static("id"), KString::from_static("my-widget"))],
            ..config()
        });
        let sibling = el.clone_element();
        assert_ne!(sibling.id(), "my-widget");
        assert_eq!(sibling.id().len(), crate::hexid::ID_LEN);
    }

    struct StaticFetch(&'static str);
    impl Fetch for StaticFetch {
        fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingFetch;
    impl Fetch for FailingFetch {
        fn fetch_text(&self, url: &str) -> Result<String> {
            bail!("GET {url} refused")
        }
    }

    #[test]
    fn t_eager_fetch() {
        let el = LiveElement::new(LiveConfig {
            eager_first_fetch: true,
            server_render: Some(Arc::new(|payload: &str| {
                Ok(format!("<b>{}</b>", payload.trim()))
            })),
            ..config()
        });
        let out = el.render(Some(&StaticFetch(" fresh ")));
        assert!(out.starts_with("<div id=\"abc\"><b>fresh</b></div>"));
    }

    #[test]
    fn t_eager_fetch_failure_falls_back() {
        let el = LiveElement::new(LiveConfig {
            eager_first_fetch: true,
            ..config()
        });
        assert!(el
            .render(Some(&FailingFetch))
            .starts_with("<div id=\"abc\">loading</div>"));
        // No fetcher at all behaves the same.
        assert!(el.render(None).starts_with("<div id=\"abc\">loading</div>"));
    }

    #[test]
    fn t_eager_fetch_markup_payload_without_server_render() {
        let el = LiveElement::new(LiveConfig {
            eager_first_fetch: true,
            ..config()
        });
        let out = el.render(Some(&StaticFetch("<p>raw</p>")));
        assert!(out.starts_with("<div id=\"abc\"><p>raw</p></div>"));
    }
}
