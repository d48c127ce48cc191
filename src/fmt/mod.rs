//! Message templates and their arguments.
//!
//! Backends with native structured logging get the template plus the ordered placeholder
//! names; every other backend gets the text produced by [`format_structured`].

mod color;
mod date;
mod render;
mod template;
mod value;

pub use color::{Color, colorize};
pub use render::render_positional;
pub use template::MessageTemplate;
pub use value::LogValue;

use crate::Error;

/// A template after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedMessage {
    /// The rendered text.
    pub text: String,
    /// Distinct placeholder names in first-occurrence order; `names[i]` was fed by `args[i]`.
    pub names: Vec<String>,
}

/// Substitutes `args` into a named-placeholder template.
///
/// An empty argument list returns the template untouched, escaped braces included.
///
/// # Errors
/// Returns [`Error::Format`] carrying the original template when rendering fails.
pub fn format_structured(template: &str, args: &[LogValue]) -> Result<FormattedMessage, Error> {
    if args.is_empty() {
        return Ok(FormattedMessage {
            text: template.to_string(),
            names: Vec::new(),
        });
    }

    let (format, names) = MessageTemplate::parse(template).into_parts();
    let text = render_positional(template, &format, args)?;
    Ok(FormattedMessage { text, names })
}

/// [`format_structured`] when only the text matters.
///
/// # Errors
/// Same as [`format_structured`].
pub fn format(template: &str, args: &[LogValue]) -> Result<String, Error> {
    format_structured(template, args).map(|m| m.text)
}

/// Pairs each placeholder name with the argument that fed it.
///
/// Arguments beyond the named placeholders are keyed by their position.
#[must_use]
pub fn properties(names: &[String], args: &[LogValue]) -> Vec<(String, LogValue)> {
    args.iter()
        .enumerate()
        .map(|(i, value)| {
            let key = names.get(i).cloned().unwrap_or_else(|| i.to_string());
            (key, value.clone())
        })
        .collect()
}
