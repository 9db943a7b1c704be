use std::sync::Arc;

use anyhow::Result;
use kstring::KString;
use lazy_static::lazy_static;
use regex::Regex;
use rouille::session::session;
use rouille::{post_input, router, Request, Response};

use htl::hexid::random_hex;
use livesite::articles::{Comment, Store};
use livesite::fetch::HttpFetcher;
use livesite::util::getenv_or;
use livesite::webparts;
use livesite::webutils::{error_boundary, errorpage, tpl_response};

lazy_static! {
    static ref NONCE_RE: Regex =
        Regex::new(r"\{\{NONCE\}\}").expect("static pattern compiles");
}

fn handle(
    request: &Request,
    store: &Store,
    fetcher: &HttpFetcher,
    api_base: &str,
    is_new_visitor: bool,
) -> Response {
    router!(request,
        (GET) (/) => {
            Response::redirect_302("/home/Friend")
        },
        (GET) (/home/{name: String}) => {
            tpl_response(200, &webparts::home_page(&name, is_new_visitor))
        },
        (GET) (/blogs) => {
            tpl_response(200, &webparts::blogs_page(&store.articles()))
        },
        (GET) (/blogs/{id: u32}) => {
            match store.article(id) {
                Some(article) => tpl_response(
                    200,
                    &webparts::article_page(&article, &store.comments_for(id))),
                None => errorpage(404, "Blog post not found", "404"),
            }
        },
        (POST) (/blogs/{id: u32}/comments) => {
            error_boundary(|| {
                if store.article(id).is_none() {
                    return Ok(errorpage(404, "Blog post not found", "404"));
                }
                let input = post_input!(request, {
                    author: String,
                    email: String,
                    body: String,
                })?;
                store.add_comment(Comment {
                    article_id: id,
                    author: KString::from_string(input.author),
                    email: KString::from_string(input.email),
                    body: KString::from_string(input.body),
                });
                Ok(Response::redirect_302(format!("/blogs/{id}")))
            })
        },
        (GET) (/live) => {
            tpl_response(
                200,
                &webparts::live_page(api_base, Some(fetcher as &dyn htl::Fetch)))
        },
        (GET) (/sample/{name: String}) => {
            error_boundary(|| {
                let nonce = random_hex(16)?;
                let page = webparts::sample_page(&name);
                page.rewrite(&*NONCE_RE, &nonce, true, true);
                Ok(tpl_response(200, &page))
            })
        },
        (GET) (/api/data) => {
            match store.random_comment() {
                Some(comment) => Response::json(&comment),
                None => Response::empty_404(),
            }
        },
        (GET) (/api/comments) => {
            Response::json(&store.comments())
        },
        _ => errorpage(404, "Not found", "This page does not exist.")
    )
}

fn main() -> Result<()> {
    let listen_addr = getenv_or("LISTEN_ADDR", "127.0.0.1:3000")?;
    // Where the live elements poll; defaults to this server itself.
    let api_base = getenv_or("API_BASE", &format!("http://{listen_addr}"))?;
    let store = Arc::new(Store::seeded());
    let fetcher = HttpFetcher::new()?;
    eprintln!("listening on http://{listen_addr}");
    rouille::start_server(listen_addr, move |request| {
        session(request, "sid", 3600, |session| {
            let is_new_visitor = !session.client_has_sid();
            handle(request, &store, &fetcher, &api_base, is_new_visitor)
        })
    });
}
