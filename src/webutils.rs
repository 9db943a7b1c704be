//! Glue between templates and rouille responses.

use std::borrow::Cow;

use anyhow::{Error, Result};
use htl::Tpl;
use rouille::{Response, ResponseBody};

use crate::warn;
use crate::webparts::error_page;

/// Send a template as HTML, streaming its chunks instead of
/// rendering the whole document up front.
pub fn tpl_response(status_code: u16, page: &Tpl) -> Response {
    Response {
        status_code,
        headers: vec![(
            Cow::from("Content-Type"),
            Cow::from("text/html; charset=utf-8"),
        )],
        data: ResponseBody::from_reader(page.chunk_reader()),
        upgrade: None,
    }
}

pub fn errorpage(status_code: u16, title: &str, message: &str) -> Response {
    tpl_response(status_code, &error_page(title, message))
}

pub fn errorpage_from_error(err: Error) -> Response {
    warn!("error in page (returning 500): {err:#}");
    errorpage(
        500,
        "Something broke",
        "An internal error happened here; it has been logged.",
    )
}

/// Run a page handler, turning an `Err` into a styled 500 response.
pub fn error_boundary(thunk: impl FnOnce() -> Result<Response>) -> Response {
    match thunk() {
        Ok(response) => response,
        Err(e) => errorpage_from_error(e),
    }
}
