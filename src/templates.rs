//! Page templates, compiled once at startup and shared read-only.

use anyhow::Context as _;
use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};
use time::{macros::format_description, OffsetDateTime};

use crate::{
    auth::AuthContext, error::AppError, forms::Form, session::Session,
    snippets::repo_types::Snippet, state::AppState,
};

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../ui/html/base.html")),
    ("home.html", include_str!("../ui/html/home.html")),
    ("show.html", include_str!("../ui/html/show.html")),
    ("create.html", include_str!("../ui/html/create.html")),
    ("signup.html", include_str!("../ui/html/signup.html")),
    ("login.html", include_str!("../ui/html/login.html")),
];

pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())
            .context("compile templates")?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> anyhow::Result<String> {
        if !self.tera.get_template_names().any(|n| n == name) {
            anyhow::bail!("the template {} does not exist", name);
        }
        self.tera
            .render(name, ctx)
            .with_context(|| format!("render {}", name))
    }
}

#[derive(Debug, Serialize)]
pub struct SnippetView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: String,
    pub expires: String,
}

impl From<Snippet> for SnippetView {
    fn from(s: Snippet) -> Self {
        Self {
            id: s.id,
            title: s.title,
            content: s.content,
            created: human_date(s.created),
            expires: human_date(s.expires),
        }
    }
}

pub fn human_date(t: OffsetDateTime) -> String {
    t.format(format_description!(
        "[day] [month repr:short] [year] at [hour]:[minute]"
    ))
    .unwrap_or_default()
}

/// Page data; the shared fields are filled in by [`render`].
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    pub form: Option<Form>,
    pub snippet: Option<SnippetView>,
    pub snippets: Vec<SnippetView>,
}

impl TemplateData {
    pub fn with_form(form: Form) -> Self {
        Self {
            form: Some(form),
            ..Default::default()
        }
    }
}

/// Renders `name`, consuming the pending flash message.
pub fn render(
    state: &AppState,
    session: &Session,
    auth: AuthContext,
    name: &str,
    mut data: TemplateData,
) -> Result<Html<String>, AppError> {
    data.current_year = OffsetDateTime::now_utc().year();
    data.flash = session.pop_flash();
    data.is_authenticated = auth.is_authenticated();
    data.csrf_token = session.csrf_token();

    let ctx = Context::from_serialize(&data).context("build template context")?;
    let html = state.templates.render(name, &ctx)?;
    Ok(Html(html))
}
