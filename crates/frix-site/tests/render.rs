//! End-to-end render passes over the fixture site.

use std::fs;
use std::path::Path;

use frix_config::Config;
use frix_site::{Frix, HandlerResponse, PageError};
use frix_renderer::RenderError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

const PAGE1_HTML: &str = concat!(
    r#"<!DOCTYPE html><html><head><meta charset="utf-8"/><title>Atomic</title></head><body>"#,
    r#"<article class="article"><header class="header">"#,
    r#"<h1 class="heading">Atom</h1><h1 class="heading">Atom</h1>"#,
    r#"<p class="author">written by <a href="https://simple.wikipedia.org/wiki/Atom">Wikipedia</a></p>"#,
    r#"</header><p>An <b>atom</b> is the smallest unit of matter.</p></article></body></html>"#,
);

const PAGE2_HTML: &str = concat!(
    r#"<!DOCTYPE html><html><head><meta charset="utf-8"/><title>Woody</title></head><body>"#,
    r#"<article class="article"><header class="header">"#,
    r#"<h1 class="heading">Tree</h1><h1 class="heading">Baum</h1>"#,
    r#"<p class="author">written by <a href="https://simple.wikipedia.org/wiki/Tree">Wikipedia</a></p>"#,
    r#"</header><p>A <i>tree</i> is a tall plant.</p></article></body></html>"#,
);

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Fresh copy of the fixture site, so output writes stay out of the tree.
fn fixture_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    copy_dir(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site"),
        dir.path(),
    );
    dir
}

fn frix(site: &TempDir, key: &str) -> Frix {
    Frix::new(Config::new(site.path()).with_key(key)).unwrap()
}

#[tokio::test]
async fn test_get_all_pages() {
    let site = fixture_site();

    let rendered = frix(&site, "key.json").render().await.unwrap();
    let pages = rendered.api.get_all_pages();

    assert_eq!(pages.keys().collect::<Vec<_>>(), ["/page1", "/page2"]);
    assert_eq!(pages["/page1"].name, "page");
    assert_eq!(
        pages["/page1"].filename,
        site.path().join("bin/page1.html").to_string_lossy()
    );
    assert_eq!(
        pages["/page2"].filename,
        site.path().join("bin/page2.html").to_string_lossy()
    );
}

#[tokio::test]
async fn test_get_content_structure() {
    let site = fixture_site();

    let rendered = frix(&site, "key.json").render().await.unwrap();
    let structure = rendered.api.get_content_structure("/page1").unwrap();

    assert_eq!(
        serde_json::to_value(structure).unwrap(),
        json!({
            "title": { "value": "Atomic", "type": "text" },
            "article": {
                "header": {
                    "heading-en": { "value": "Atom", "type": "text" },
                    "heading-de": { "value": "Atom", "type": "text" },
                    "author": {
                        "name": { "value": "Wikipedia", "type": "text" },
                        "link": {
                            "value": "https://simple.wikipedia.org/wiki/Atom",
                            "type": "url"
                        }
                    }
                },
                "text": {
                    "value": "An <b>atom</b> is the smallest unit of matter.",
                    "type": "richtext"
                }
            }
        })
    );
    assert!(rendered.api.get_content_structure("/nope").is_none());
}

#[tokio::test]
async fn test_get_opt() {
    let site = fixture_site();
    let frix = frix(&site, "key.json");

    let rendered = frix.render().await.unwrap();

    assert_eq!(rendered.api.get_opt(), frix.config());
}

#[tokio::test]
async fn test_handler_serves_pages() {
    let site = fixture_site();

    let rendered = frix(&site, "key.json").render().await.unwrap();

    assert_eq!(
        rendered.handler.handle("/page1"),
        HandlerResponse::Page(PAGE1_HTML.to_owned())
    );
    assert_eq!(rendered.handler.handle("/page2/").body(), PAGE2_HTML);
    assert_eq!(rendered.handler.handle("/page3"), HandlerResponse::NotFound);
}

#[tokio::test]
async fn test_pages_written_to_bin() {
    let site = fixture_site();

    frix(&site, "key.json").render().await.unwrap();

    assert_eq!(
        fs::read_to_string(site.path().join("bin/page1.html")).unwrap(),
        PAGE1_HTML
    );
    assert_eq!(
        fs::read_to_string(site.path().join("bin/page2.html")).unwrap(),
        PAGE2_HTML
    );
}

#[tokio::test]
async fn test_loops() {
    let site = fixture_site();

    let rendered = frix(&site, "loop-test.json").render().await.unwrap();

    assert_eq!(
        rendered.handler.handle("/loop").body(),
        concat!(
            r#"<article class="article"><header class="header">"#,
            r#"<h1 class="heading">Atom</h1><h1 class="heading">Atom</h1>"#,
            r#"<p class="author">written by <a href="/a">A</a></p></header><p>one</p></article>"#,
            r#"<article class="article"><header class="header">"#,
            r#"<h1 class="heading">Tree</h1><h1 class="heading">Baum</h1>"#,
            r#"<p class="author">written by <a href="/b">B</a></p></header><p>two</p></article>"#,
            r#"<br/><cite class="quote">first</cite><br/><br/><cite class="quote">second</cite><br/>"#,
        )
    );
    let structure = rendered.api.get_content_structure("/loop").unwrap();
    assert_eq!(structure.pointer("quotes/1/text").unwrap().as_leaf().unwrap().value, "second");
}

#[tokio::test]
async fn test_css_scoped_per_nesting_context() {
    let site = fixture_site();

    let rendered = frix(&site, "css-test.json").render().await.unwrap();

    let expected = concat!(
        ".article > .header h1 { font-weight: bold; }\n",
        ".header > .author p { font-size: 20px; }\n",
        ".author p { font-size: 20px; }\n",
    );
    assert_eq!(rendered.api.stylesheet(), expected);
    assert_eq!(
        fs::read_to_string(site.path().join("bin/main.css")).unwrap(),
        expected
    );
}

#[tokio::test]
async fn test_css_deduplicated_across_pages() {
    let site = fixture_site();

    let rendered = frix(&site, "key.json").render().await.unwrap();

    assert_eq!(
        rendered.api.stylesheet(),
        concat!(
            ".article > .header h1 { font-weight: bold; }\n",
            ".header > .author p { font-size: 20px; }\n",
        )
    );
}

#[tokio::test]
async fn test_modifiers() {
    let site = fixture_site();
    let mut frix = frix(&site, "key.json");
    frix.add_modifier("content", |html: String| async move {
        html.replace("written by", "by")
    })
    .unwrap();
    frix.add_modifier("header", |head: String| async move {
        format!(r#"{head}<link rel="stylesheet" href="/main.css"/>"#)
    })
    .unwrap();
    frix.add_modifier("css", |css: String| async move { css.replace("20px", "30px") })
        .unwrap();

    let rendered = frix.render().await.unwrap();
    let html = rendered.handler.handle("/page1").body().to_owned();

    assert!(html.contains(r#"<p class="author">by <a"#), "{html}");
    assert!(
        html.contains(r#"<title>Atomic</title><link rel="stylesheet" href="/main.css"/></head>"#),
        "{html}"
    );
    assert!(rendered.api.stylesheet().contains(".header > .author p { font-size: 30px; }"));
}

#[tokio::test]
async fn test_registrations_persist_across_passes() {
    let site = fixture_site();
    let mut frix = frix(&site, "key.json");
    frix.add_modifier("content", |html: String| async move { format!("{html}<!-- x -->") })
        .unwrap();

    let first = frix.render().await.unwrap();
    frix.config_mut().key = "loop-test.json".to_owned();
    let second = frix.render().await.unwrap();

    assert!(first.handler.handle("/page1").body().ends_with("<!-- x -->"));
    assert!(second.handler.handle("/loop").body().ends_with("<!-- x -->"));
    assert_eq!(first.api.get_all_pages().len(), 2);
}

#[tokio::test]
async fn test_failing_pages_do_not_abort_pass() {
    let site = fixture_site();

    let rendered = frix(&site, "broken-test.json").render().await.unwrap();

    assert_eq!(
        rendered.api.get_all_pages().keys().collect::<Vec<_>>(),
        ["/page1"]
    );
    let failures = rendered.api.failures();
    assert_eq!(
        failures.iter().map(|f| f.url.as_str()).collect::<Vec<_>>(),
        ["/missing", "/unknown", "/untitled"]
    );
    assert!(matches!(failures[0].reason, PageError::ContentLoad(_)));
    assert!(matches!(
        &failures[1].reason,
        PageError::Render(RenderError::UnknownTemplate(name)) if name == "gallery"
    ));
    assert!(matches!(
        &failures[2].reason,
        PageError::Render(RenderError::MissingContent { template, key })
            if template == "page" && key == "title"
    ));

    assert_eq!(rendered.handler.handle("/untitled"), HandlerResponse::NotFound);
    assert_eq!(rendered.handler.handle("/page1").body(), PAGE1_HTML);
    assert!(!site.path().join("bin/untitled.html").exists());
    assert!(
        fs::read_to_string(site.path().join("bin/main.css"))
            .unwrap()
            .contains("font-weight: bold")
    );
}

#[tokio::test]
async fn test_missing_key_document() {
    let site = fixture_site();

    let result = frix(&site, "nope.json").render().await;

    assert!(result.is_err());
}
