use std::sync::{Arc, OnceLock};

use serde::Serialize;
use silent_ssg::prelude::*;
use silent_ssg::i18n;
use silent_ssg::tera::{Context, Tera};

static TEMPLATES: OnceLock<Arc<Tera>> = OnceLock::new();

#[derive(Debug, Clone, Serialize)]
struct Entry {
    slug: &'static str,
    title: &'static str,
    body: &'static str,
}

static ENTRIES: [Entry; 2] = [
    Entry {
        slug: "first-entry",
        title: "First entry",
        body: "Hello from the first entry.",
    },
    Entry {
        slug: "second-entry",
        title: "Second entry",
        body: "And a second one.",
    },
];

fn render(req: &Request, name: &str, mut ctx: Context) -> SsgResult<Response> {
    let tera = TEMPLATES
        .get()
        .cloned()
        .ok_or_else(|| SsgError::config_error("templates are not loaded"))?;
    ctx.insert("path", req.uri().path());
    ctx.insert("lang", req.locale().unwrap_or("en"));
    Ok(Response::deferred(TemplateView::new(tera, name, ctx)))
}

async fn landing(req: Request) -> SsgResult<Response> {
    render(&req, "landing.html", Context::new())
}

async fn about(req: Request) -> SsgResult<Response> {
    render(&req, "about.html", Context::new())
}

async fn blog_list(req: Request) -> SsgResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("entries", &ENTRIES);
    render(&req, "blog_list.html", ctx)
}

async fn blog_entry(req: Request) -> SsgResult<Response> {
    let slug: String = req.get_path_params("slug")?;
    let entry = ENTRIES
        .iter()
        .find(|e| e.slug == slug)
        .ok_or_else(|| SsgError::business_error(StatusCode::NOT_FOUND, "no such entry"))?;
    let mut ctx = Context::new();
    ctx.insert("entry", entry);
    render(&req, "blog_entry.html", ctx)
}

async fn non_i18n(req: Request) -> SsgResult<Response> {
    render(&req, "non_i18n.html", Context::new())
}

async fn robots(_req: Request) -> SsgResult<Response> {
    Ok(Response::text("User-agent: *\nDisallow:\n"))
}

fn routes() -> RouteTable {
    RouteTable::new()
        .with_settings(RouteSettings::default().with_languages(["en", "nl"]))
        .append(
            Group::i18n()
                .append(Leaf::new("", landing).name("landing").include_in_ssg())
                .append(Leaf::new("about/", about).name("about").include_in_ssg())
                .append(
                    Group::new("blog/")
                        .namespace("blog")
                        .append(Leaf::new("", blog_list).name("list").include_in_ssg())
                        .append(
                            Leaf::new("<slug>/", blog_entry)
                                .name("entry")
                                .ssg_params_with(|| {
                                    ENTRIES
                                        .iter()
                                        .map(|e| params([("slug", e.slug)]))
                                        .collect()
                                }),
                        ),
                ),
        )
        .append(Leaf::new("non-i18n/", non_i18n).name("non_i18n").include_in_ssg())
        .append(Leaf::new("robots.txt", robots).name("robots").include_in_ssg())
        .append(Leaf::new("not-included/", non_i18n).name("not_included"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::fmt().with_max_level(Level::INFO).init();

    let table = routes();
    let mut tera = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html"))?;
    i18n::register_filters(&mut tera, Arc::new(table.clone()));
    let _ = TEMPLATES.set(Arc::new(tera));
    debug!("routes:\n{table:?}");

    let site = Site::new().with_routes("my_website", table).with_assets(
        StaticFiles::new("/assets/").with_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
    );
    run(site).await?;
    Ok(())
}
