use std::fs;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use silent_ssg::route::{Group, Leaf, RouteSettings, RouteTable};
use silent_ssg::serve::StaticSite;
use silent_ssg::ssg::{
    AssetCollector, BuildOptions, StaticFiles, build_static, parse_redirect_target,
};
use silent_ssg::{
    BoxedError, Client, Method, Request, Response, SsgResult, StatusCode, params, stream_body,
};
use tempfile::TempDir;
use walkdir::WalkDir;

async fn landing(req: Request) -> SsgResult<Response> {
    Ok(Response::html(&format!(
        "<h1>landing {}</h1>",
        req.locale().unwrap_or_default()
    )))
}

async fn about(req: Request) -> SsgResult<Response> {
    Ok(Response::html(&format!(
        "<h1>about {}</h1>",
        req.locale().unwrap_or_default()
    )))
}

async fn blog_entry(req: Request) -> SsgResult<Response> {
    let slug: String = req.get_path_params("slug")?;
    Ok(Response::html(&format!("<article>{slug}</article>")))
}

async fn non_i18n(_req: Request) -> SsgResult<Response> {
    Ok(Response::html("<p>plain</p>"))
}

async fn robots(_req: Request) -> SsgResult<Response> {
    Ok(Response::text("User-agent: *\nDisallow:\n"))
}

async fn feed(_req: Request) -> SsgResult<Response> {
    let chunks = ["<feed>", "<entry/>", "</feed>"]
        .into_iter()
        .map(|c| Ok::<_, BoxedError>(Bytes::from_static(c.as_bytes())));
    let mut res = Response::empty().with_body(stream_body(stream::iter(chunks)));
    res.set_header(
        silent_ssg::header::CONTENT_TYPE,
        silent_ssg::header::HeaderValue::from_static("application/atom+xml"),
    );
    Ok(res)
}

fn table() -> RouteTable {
    RouteTable::new()
        .with_settings(RouteSettings::default().with_languages(["en", "nl"]))
        .append(
            Group::i18n()
                .append(Leaf::new("", landing).name("landing").include_in_ssg())
                .append(Leaf::new("about/", about).name("about").include_in_ssg())
                .append(
                    Group::new("blog/").namespace("blog").append(
                        Leaf::new("<slug>/", blog_entry)
                            .name("entry")
                            .ssg_params_with(|| {
                                ["first-entry", "second-entry"]
                                    .into_iter()
                                    .map(|slug| params([("slug", slug)]))
                                    .collect()
                            }),
                    ),
                ),
        )
        .append(Leaf::new("non-i18n/", non_i18n).name("non_i18n").include_in_ssg())
        .append(Leaf::new("robots.txt", robots).name("robots").include_in_ssg())
        .append(Leaf::new("feed.xml", feed).name("feed").include_in_ssg())
        .append(Leaf::new("not-included/", non_i18n).name("not_included"))
}

async fn build_into(out: &Path, clear: bool) -> SsgResult<()> {
    let table = Arc::new(table());
    let client = Client::new(Arc::clone(&table));
    let options = BuildOptions::default()
        .with_output_dir(out)
        .with_output_clear(clear);
    build_static(&table, &client, None, &options).await?;
    Ok(())
}

fn read(out: &Path, rel: &str) -> String {
    fs::read_to_string(out.join(rel)).unwrap_or_else(|e| panic!("{rel}: {e}"))
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
            (rel, fs::read(entry.path()).unwrap())
        })
        .collect()
}

// ==================== 端到端构建测试 ====================

#[tokio::test]
async fn test_landing_layout() {
    let tmp = TempDir::new().unwrap();
    build_into(tmp.path(), true).await.unwrap();
    let out = tmp.path();

    assert_eq!(read(out, "en/index.html"), "<h1>landing en</h1>");
    assert_eq!(read(out, "nl/index.html"), "<h1>landing nl</h1>");
    assert_eq!(
        parse_redirect_target(&read(out, "index.html")).as_deref(),
        Some("/en/")
    );
    assert_eq!(
        parse_redirect_target(&read(out, "en.html")).as_deref(),
        Some("/en/")
    );
    assert_eq!(
        parse_redirect_target(&read(out, "nl.html")).as_deref(),
        Some("/nl/")
    );
}

#[tokio::test]
async fn test_about_and_blog_layout() {
    let tmp = TempDir::new().unwrap();
    build_into(tmp.path(), true).await.unwrap();
    let out = tmp.path();

    assert_eq!(read(out, "en/about/index.html"), "<h1>about en</h1>");
    assert_eq!(read(out, "nl/about/index.html"), "<h1>about nl</h1>");
    for (file, target) in [
        ("about/index.html", "/en/about/"),
        ("en/about.html", "/en/about/"),
        ("about.html", "/en/about/"),
        ("nl/about.html", "/nl/about/"),
    ] {
        assert_eq!(
            parse_redirect_target(&read(out, file)).as_deref(),
            Some(target),
            "{file}"
        );
    }
    assert_eq!(
        read(out, "nl/blog/second-entry/index.html"),
        "<article>second-entry</article>"
    );
    assert!(out.join("blog/first-entry/index.html").is_file());
    assert!(!out.join("not-included").exists());
}

#[tokio::test]
async fn test_non_i18n_and_non_html() {
    let tmp = TempDir::new().unwrap();
    build_into(tmp.path(), true).await.unwrap();
    let out = tmp.path();

    assert_eq!(read(out, "non-i18n/index.html"), "<p>plain</p>");
    assert_eq!(
        parse_redirect_target(&read(out, "non-i18n.html")).as_deref(),
        Some("/non-i18n/")
    );
    assert_eq!(read(out, "robots.txt"), "User-agent: *\nDisallow:\n");
    assert_eq!(read(out, "feed.xml"), "<feed><entry/></feed>");
    assert!(!out.join("robots.txt.html").exists());
}

// ==================== 可重复性测试 ====================

#[tokio::test]
async fn test_clear_builds_are_identical() {
    let tmp = TempDir::new().unwrap();
    build_into(tmp.path(), true).await.unwrap();
    let first = snapshot(tmp.path());
    fs::write(tmp.path().join("stale.html"), "stale").unwrap();
    build_into(tmp.path(), true).await.unwrap();
    assert_eq!(first, snapshot(tmp.path()));
}

#[tokio::test]
async fn test_noclear_keeps_existing_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("stale.html"), "stale").unwrap();
    build_into(tmp.path(), false).await.unwrap();
    assert_eq!(read(tmp.path(), "stale.html"), "stale");
    assert!(tmp.path().join("en/index.html").is_file());
}

// ==================== 静态资源测试 ====================

#[tokio::test]
async fn test_assets_are_collected() {
    let src = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("css")).unwrap();
    fs::write(src.path().join("css/site.css"), "body {}").unwrap();
    fs::write(src.path().join("css/site.scss"), "$x: 1;").unwrap();

    let tmp = TempDir::new().unwrap();
    let table = Arc::new(table());
    let client = Client::new(Arc::clone(&table));
    let assets = StaticFiles::new("/assets/").with_dir(src.path());
    let assets: &dyn AssetCollector = &assets;
    let options = BuildOptions::default()
        .with_output_dir(tmp.path())
        .with_staticfiles_ignore("*.scss");
    let report = build_static(&table, &client, Some(assets), &options)
        .await
        .unwrap();

    assert_eq!(report.assets.len(), 1);
    assert_eq!(read(tmp.path(), "assets/css/site.css"), "body {}");
    assert!(!tmp.path().join("assets/css/site.scss").exists());
}

// ==================== 预览测试 ====================

#[tokio::test]
async fn test_built_site_is_servable() {
    let tmp = TempDir::new().unwrap();
    build_into(tmp.path(), true).await.unwrap();
    let site = StaticSite::new(tmp.path());

    for path in ["/", "/en/", "/en/about/", "/about", "/nl/blog/first-entry/", "/robots.txt"] {
        let res = site.respond(&Method::GET, path).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
    let res = site.respond(&Method::GET, "/not-included/").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
