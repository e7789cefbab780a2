//! HTML templates, compiled into the binary
//!
//! Names end in `.html`, so minijinja auto-escapes every interpolated
//! value. That includes rows returned by the lookup page.

use anyhow::{Context, Result};
use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("user_page.html", include_str!("../templates/user_page.html")),
    ("thought.html", include_str!("../templates/thought.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .with_context(|| format!("Failed to compile template {}", name))?;
        }
        Ok(Self { env })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<Html<String>> {
        let template = self.env.get_template(name)?;
        let body = template
            .render(context)
            .with_context(|| format!("Failed to render template {}", name))?;
        Ok(Html(body))
    }
}
