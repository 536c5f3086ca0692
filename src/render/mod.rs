//! Server-rendered pages for filehost.
//!
//! Templates are compiled into the binary and rendered with minijinja. The
//! file page picks its body from the file kind, and its Open Graph tags follow
//! the same choice (see [`OpenGraph`]).

mod opengraph;
mod view;

pub use opengraph::{
    OgImage, OgTag, OgVideo, OpenGraph, DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH,
    PLACEHOLDER_ICON_PATH, PLACEHOLDER_ICON_SIZE,
};
pub use view::{absolute_url, format_size, CommentView, FileView, SiteContext};

use minijinja::{context, Environment, Value};
use tracing::debug;

use crate::comment::CommentWithAuthor;
use crate::db::User;
use crate::file::FileRecord;
use crate::Result;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("file.html", include_str!("../../templates/file.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Page renderer holding the compiled templates.
pub struct PageRenderer {
    env: Environment<'static>,
    site: SiteContext,
}

impl PageRenderer {
    /// Compile the embedded templates.
    pub fn new(site: SiteContext) -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
            debug!("Loaded template: {}", name);
        }
        Ok(Self { env, site })
    }

    /// Include template source context in render errors.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.env.set_debug(debug);
        self
    }

    /// Site values shared by all pages.
    pub fn site(&self) -> &SiteContext {
        &self.site
    }

    /// Render the index page listing `files`.
    pub fn render_index(
        &self,
        files: &[FileRecord],
        viewer: Option<&User>,
        page: u32,
        total_pages: u32,
    ) -> Result<String> {
        let files: Vec<FileView> = files
            .iter()
            .map(|f| FileView::new(f, None, &self.site))
            .collect();
        let og = OpenGraph::for_site(&self.site);

        self.render(
            "index.html",
            context! {
                files => files,
                page => page,
                total_pages => total_pages,
                og_description => og.description.clone(),
                og => og.tags(),
                viewer => viewer_context(viewer),
            },
        )
    }

    /// Render the page of one file with its comments.
    ///
    /// `raw_token` is the token the page was requested with, if it came as
    /// a query parameter; private media links repeat it.
    pub fn render_file_page(
        &self,
        file: &FileRecord,
        author: Option<&str>,
        comments: &[CommentWithAuthor],
        viewer: Option<&User>,
        raw_token: Option<&str>,
    ) -> Result<String> {
        let og = OpenGraph::for_file(file, &self.site);
        let comments: Vec<CommentView> = comments
            .iter()
            .map(|c| CommentView::new(c, &self.site))
            .collect();

        self.render(
            "file.html",
            context! {
                file => FileView::new(file, author, &self.site).with_raw_token(raw_token),
                comments => comments,
                og_description => og.description.clone(),
                og => og.tags(),
                viewer => viewer_context(viewer),
            },
        )
    }

    /// Render an error page.
    pub fn render_error(&self, status: u16, message: &str) -> Result<String> {
        let og = OpenGraph::for_site(&self.site);
        self.render(
            "error.html",
            context! {
                status => status,
                message => message,
                og_description => og.description.clone(),
                og => og.tags(),
                viewer => Value::from(()),
            },
        )
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(name)?;
        let ctx = context! { site => &self.site, ..ctx };
        Ok(template.render(ctx)?)
    }
}

fn viewer_context(viewer: Option<&User>) -> Value {
    match viewer {
        Some(user) => context! {
            id => user.id,
            username => user.username.clone(),
        },
        None => Value::from(()),
    }
}
