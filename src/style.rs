//! The stylesheet shared by every page.

use htl::Tpl;

/// The `nonce` placeholder is rewritten per request before the page
/// goes out (see the `/sample` route).
pub fn style() -> Tpl {
    Tpl::lit(
        r#"<style nonce="{{NONCE}}">
  html,
  body {
    height: 100%;
    margin: 0;
    padding: 0;
    background: #181a20;
    color: #e5e5e5;
    font-family: "JetBrains Mono", "Menlo", "Consolas", monospace;
    font-size: 18px;
    min-height: 100vh;
    box-sizing: border-box;
  }
  body {
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    min-height: 100vh;
    padding: 0 1.5rem;
  }
  h1 {
    font-size: 2.5rem;
    font-weight: 700;
    margin: 0 0 0.5em 0;
    color: #7df9aa;
  }
  h2 {
    font-size: 1.2rem;
    font-weight: 400;
    margin: 0 0 1.5em 0;
    color: #a0a0a0;
  }
  p {
    max-width: 500px;
    margin: 0 0 1em 0;
    line-height: 1.6;
    color: #c0c0c0;
  }
  a {
    color: #7df9aa;
    text-decoration: none;
    border-bottom: 1px dashed #7df9aa;
  }
  a:hover {
    border-bottom: 1px solid #7df9aa;
  }
  .card {
    background: #23262f;
    border-radius: 6px;
    padding: 0.5rem 1rem;
    margin: 0.5rem 0;
    text-align: left;
  }
  .welcome {
    color: #7df9aa;
  }
  .live-box {
    min-height: 100px;
    margin: 10px;
    max-width: 100%;
  }
  form.comment input,
  form.comment textarea {
    display: block;
    width: 100%;
    margin: 0.3rem 0;
    background: #23262f;
    color: #e5e5e5;
    border: 1px solid #3a3d46;
    padding: 0.3rem;
  }
  ::selection {
    background: #7df9aa33;
  }
</style>"#,
    )
}
