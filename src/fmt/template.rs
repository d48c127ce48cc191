//! Named-placeholder templates (`"User {user} logged in from {ip}"`) turned into positional
//! format strings (`"User {0} logged in from {1}"`), so that backends without native
//! structured logging can still render them against an ordered argument list.

use regex::Regex;
use std::sync::LazyLock;

/// `{`, optional `@` destructure hint, a name without space/colon/braces, optional `:format`, `}`.
/// The "not preceded by `{`" half of the rule is checked by hand since `regex` has no
/// look-behind.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@?(?<arg>[^ :{}]+)(?<format>:[^}]+)?\}").expect("Invalid placeholder regex")
});

/// A template rewritten to positional form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    format: String,
    names: Vec<String>,
}

impl MessageTemplate {
    /// Rewrites every named placeholder to `{index[:format]}`.
    ///
    /// Purely numeric placeholders are already positional and keep their index. A name gets
    /// the next free index the first time it appears; later occurrences of the same name
    /// reuse it. Escaped braces (`{{`, `}}`) are left for the positional renderer to collapse.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut format = String::with_capacity(template.len());
        let mut names: Vec<String> = Vec::new();
        let mut copied = 0;
        let mut search = 0;

        while let Some(caps) = PLACEHOLDER_REGEX.captures_at(template, search) {
            let Some(whole) = caps.get(0) else {
                break;
            };

            if template[..whole.start()].ends_with('{') {
                search = whole.start() + 1;
                continue;
            }

            let arg = &caps["arg"];
            let spec = caps.name("format").map_or("", |m| m.as_str());

            let index = if arg.bytes().all(|b| b.is_ascii_digit()) {
                arg.to_string()
            } else {
                let index = names.iter().position(|n| n == arg).unwrap_or_else(|| {
                    names.push(arg.to_string());
                    names.len() - 1
                });
                index.to_string()
            };

            format.push_str(&template[copied..whole.start()]);
            format.push('{');
            format.push_str(&index);
            format.push_str(spec);
            format.push('}');

            copied = whole.end();
            search = whole.end();
        }

        format.push_str(&template[copied..]);
        Self { format, names }
    }

    /// The positional form of the template.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Distinct placeholder names in first-occurrence order; index `i` feeds `{i}`.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.format, self.names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_get_sequential_indices() {
        let t = MessageTemplate::parse("{a} then {b} then {c}");
        assert_eq!(t.format(), "{0} then {1} then {2}");
        assert_eq!(t.names(), ["a", "b", "c"]);
    }

    #[test]
    fn repeated_names_reuse_their_index() {
        let t = MessageTemplate::parse("{user} saw {item}; {user} left");
        assert_eq!(t.format(), "{0} saw {1}; {0} left");
        assert_eq!(t.names(), ["user", "item"]);
    }

    #[test]
    fn format_suffix_is_preserved_and_hint_stripped() {
        let t = MessageTemplate::parse("at {when:yyyy-MM-dd} got {@payload}");
        assert_eq!(t.format(), "at {0:yyyy-MM-dd} got {1}");
        assert_eq!(t.names(), ["when", "payload"]);
    }

    #[test]
    fn numeric_placeholders_stay_positional() {
        let t = MessageTemplate::parse("{0} and {1:D3}");
        assert_eq!(t.format(), "{0} and {1:D3}");
        assert!(t.names().is_empty());
    }

    #[test]
    fn escaped_braces_are_not_placeholders() {
        let t = MessageTemplate::parse("{arg} and {{escaped}}");
        assert_eq!(t.format(), "{0} and {{escaped}}");
        assert_eq!(t.names(), ["arg"]);
    }

    #[test]
    fn placeholder_after_rejected_candidate_is_found() {
        let t = MessageTemplate::parse("{{a:{b}");
        assert_eq!(t.format(), "{{a:{0}");
        assert_eq!(t.names(), ["b"]);
    }
}
