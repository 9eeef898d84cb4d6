//! HTML page rendering
//!
//! Jinja templates are embedded at compile time so the binary has no runtime
//! file dependencies.

use std::sync::LazyLock;

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Error};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Format a Unix epoch (seconds, fractional) as UTC with millisecond precision
#[allow(clippy::needless_pass_by_value)]
fn datetime(value: Value) -> Value {
    let Ok(epoch) = f64::try_from(value.clone()) else {
        return value;
    };

    let micros = (epoch * 1_000_000.0).round() as i64;
    match chrono::DateTime::from_timestamp_micros(micros) {
        Some(ts) => Value::from(ts.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()),
        None => value,
    }
}

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();

    env.set_auto_escape_callback(|name| {
        let is_html = std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if is_html {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    env.add_filter("datetime", datetime);

    for name in Templates::iter() {
        let Some(file) = Templates::get(&name) else {
            continue;
        };
        let source = match String::from_utf8(file.data.into_owned()) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(template = %name, error = %e, "Template is not valid UTF-8");
                continue;
            }
        };
        if let Err(e) = env.add_template_owned(name.to_string(), source) {
            tracing::error!(template = %name, error = %e, "Failed to load template");
        }
    }

    env
});

/// Render an embedded template with a serializable context
pub fn render_template<T: serde::Serialize>(name: &str, ctx: T) -> Result<String, Error> {
    let tpl = ENV.get_template(name)?;
    tpl.render(ctx)
}
