//! Link and variable resolution.
//!
//! Three substitution rules run during serialization:
//! - `%name%` variable references, in prose and in verbatim content
//! - `{param}` placeholders inside explicit-link and autolink URLs
//! - `[[text]]` wiki links, sensitive to single-page vs. multi-page
//!   output and to the resource base path
//!
//! All failures are soft: an unknown variable renders as literal
//! `Unknown variable: <name>` text, an unknown `{param}` stays as
//! written.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `%name%`: names start with a letter or underscore so prose
/// percentages (`50%`) stay literal.
pub(crate) static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z_][A-Za-z0-9_-]*)%").expect("variable pattern"));

/// `{param}` inside link URLs.
static LINK_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_-]*)\}").expect("link parameter pattern"));

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace every `%name%` occurrence with its configured value.
///
/// Values are pre-escaped at configuration load, so this runs safely
/// over already-escaped HTML (code block content included). Unknown
/// names become visible `Unknown variable: <name>` text.
#[must_use]
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    if !text.contains('%') {
        return text.to_owned();
    }
    VARIABLE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            variables
                .get(name)
                .map_or_else(|| format!("Unknown variable: {name}"), Clone::clone)
        })
        .into_owned()
}

/// Replace every `{param}` occurrence in a URL with its configured
/// value. Unresolved names are left as literal `{param}` text.
#[must_use]
pub fn substitute_link_params(url: &str, parameters: &HashMap<String, String>) -> String {
    if !url.contains('{') {
        return url.to_owned();
    }
    LINK_PARAM_RE
        .replace_all(url, |caps: &Captures<'_>| match parameters.get(&caps[1]) {
            Some(value) => Cow::Borrowed(value.as_str()),
            None => Cow::Owned(caps[0].to_owned()),
        })
        .into_owned()
}

/// Resolution of a `[[text]]` wiki reference.
#[derive(Debug, PartialEq, Eq)]
pub enum WikiTarget {
    /// An anchor or page link.
    Link {
        /// Resolved href.
        href: String,
        /// Display text.
        text: String,
    },
    /// An inline image.
    Image {
        /// Resolved image source.
        src: String,
    },
}

/// Resolve a wiki reference according to render mode and base paths.
///
/// `[[label|target]]` links to `target` (or `#target` in single-page
/// mode) displaying `label`. `[[name.png]]` resolves to an image under
/// `resources_path`, relative to the current page directory unless the
/// path is absolute. Anything else links to itself.
#[must_use]
pub fn resolve_wiki_link(
    text: &str,
    resources_path: &str,
    page_dir: Option<&str>,
    single_page: bool,
) -> WikiTarget {
    let anchor = |target: &str| {
        if single_page {
            format!("#{target}")
        } else {
            target.to_owned()
        }
    };

    if let Some((label, target)) = text.split_once('|') {
        return WikiTarget::Link {
            href: anchor(target),
            text: label.to_owned(),
        };
    }

    if text.ends_with(".png") {
        let src = if text.starts_with("http://") || text.starts_with("https://") {
            text.to_owned()
        } else if text.starts_with('/') {
            format!("{resources_path}{text}")
        } else {
            match page_dir {
                Some(dir) if !dir.is_empty() => format!("{resources_path}/{dir}/{text}"),
                _ => format!("{resources_path}/{text}"),
            }
        };
        return WikiTarget::Image { src };
    }

    WikiTarget::Link {
        href: anchor(text),
        text: text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }

    #[test]
    fn test_substitute_variables() {
        let v = vars(&[("version", "1.4.2")]);
        assert_eq!(substitute_variables("v%version%", &v), "v1.4.2");
    }

    #[test]
    fn test_substitute_unknown_variable() {
        let v = vars(&[]);
        assert_eq!(
            substitute_variables("%missing%", &v),
            "Unknown variable: missing"
        );
    }

    #[test]
    fn test_percentages_stay_literal() {
        let v = vars(&[("v", "x")]);
        assert_eq!(substitute_variables("50% of 100%", &v), "50% of 100%");
    }

    #[test]
    fn test_substitute_link_params() {
        let p = vars(&[("repo", "https://example.com/r")]);
        assert_eq!(
            substitute_link_params("{repo}/blob/main", &p),
            "https://example.com/r/blob/main"
        );
    }

    #[test]
    fn test_unresolved_link_param_stays() {
        let p = vars(&[]);
        assert_eq!(substitute_link_params("{repo}/x", &p), "{repo}/x");
    }

    #[test]
    fn test_wiki_link_multi_page() {
        let target = resolve_wiki_link("A|B", "/res", None, false);
        assert_eq!(
            target,
            WikiTarget::Link {
                href: "B".to_owned(),
                text: "A".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_link_single_page() {
        let target = resolve_wiki_link("A|B", "/res", None, true);
        assert_eq!(
            target,
            WikiTarget::Link {
                href: "#B".to_owned(),
                text: "A".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_plain_text() {
        let target = resolve_wiki_link("setup", "/res", None, false);
        assert_eq!(
            target,
            WikiTarget::Link {
                href: "setup".to_owned(),
                text: "setup".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_image_relative() {
        let target = resolve_wiki_link("shot.png", "/res", Some("guides"), false);
        assert_eq!(
            target,
            WikiTarget::Image {
                src: "/res/guides/shot.png".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_image_rooted() {
        let target = resolve_wiki_link("/logo.png", "/res", Some("guides"), false);
        assert_eq!(
            target,
            WikiTarget::Image {
                src: "/res/logo.png".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_image_absolute_url() {
        let target = resolve_wiki_link("https://cdn.example.com/a.png", "/res", None, false);
        assert_eq!(
            target,
            WikiTarget::Image {
                src: "https://cdn.example.com/a.png".to_owned()
            }
        );
    }

    #[test]
    fn test_wiki_image_without_page_dir() {
        let target = resolve_wiki_link("a.png", "/res", None, false);
        assert_eq!(
            target,
            WikiTarget::Image {
                src: "/res/a.png".to_owned()
            }
        );
    }
}
