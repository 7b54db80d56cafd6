use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use ammonia::UrlRelative;
use linkify::{LinkFinder, LinkKind};
use tracing::debug;

use mythmail_core::Email;

pub const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "i", "u", "strong", "em", "p", "br", "div", "span", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "blockquote", "pre", "code", "table", "thead", "tbody", "tr", "th",
    "td", "img", "hr", "font", "center",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "title", "width", "height", "style", "class", "target", "rel", "align",
    "valign", "bgcolor", "color", "size",
];

pub const FORBIDDEN_TAGS: &[&str] = &[
    "script", "iframe", "object", "embed", "form", "input", "button",
];

pub const FORBIDDEN_ATTRIBUTES: &[&str] = &["onerror", "onload", "onclick", "onmouseover"];

pub const ALLOWED_URI_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "tel", "callto", "cid", "xmpp", "data",
];

/// Containers whose text is never content: dropped together with their children.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "noscript", "noembed", "noframes", "template", "title", "svg",
    "math", "xmp", "plaintext",
];

// Overwritten on every anchor, so never taken from the input.
const FORCED_ATTRIBUTES: &[&str] = &["target", "rel"];

const URI_ATTRIBUTES: &[&str] = &["href", "src"];

const LINK_REL: &str = "noopener noreferrer";

/// Markup that went through [`sanitize`]; only constructed by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Renders the markup as wrapped terminal text.
    pub fn to_text(&self, width_cols: usize) -> String {
        if self.is_empty() {
            return String::new();
        }
        let text = html2text::from_read(self.0.as_bytes(), width_cols.max(20));
        html_escape::decode_html_entities(&text).to_string()
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filters untrusted email HTML down to the allow-list.
///
/// Parsing never fails: broken markup is repaired by the HTML5 tree builder
/// and anything that is not an allowed element ends up as escaped text.
/// Anchors get `target="_blank"` and `rel="noopener noreferrer"` and images
/// get `loading="lazy"` after filtering, replacing whatever the input had.
pub fn sanitize(html: &str) -> SanitizedHtml {
    if html.trim().is_empty() {
        return SanitizedHtml::default();
    }
    SanitizedHtml(build_cleaner().clean(html).to_string())
}

pub fn sanitize_optional(html: Option<&str>) -> SanitizedHtml {
    html.map(sanitize).unwrap_or_default()
}

fn build_cleaner() -> ammonia::Builder<'static> {
    let tags: HashSet<&str> = ALLOWED_TAGS
        .iter()
        .copied()
        .filter(|tag| !FORBIDDEN_TAGS.contains(tag))
        .collect();
    let attributes: HashSet<&str> = ALLOWED_ATTRIBUTES
        .iter()
        .copied()
        .filter(|attr| !FORBIDDEN_ATTRIBUTES.contains(attr) && !FORCED_ATTRIBUTES.contains(attr))
        .collect();

    let mut builder = ammonia::Builder::default();
    builder
        .tags(tags)
        .clean_content_tags(DROP_WITH_CONTENT.iter().copied().collect())
        .tag_attributes(HashMap::new())
        .generic_attributes(attributes)
        .url_schemes(ALLOWED_URI_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some(LINK_REL))
        .set_tag_attribute_value("a", "target", "_blank")
        .set_tag_attribute_value("img", "loading", "lazy")
        .strip_comments(true)
        .attribute_filter(filter_attribute);
    builder
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if URI_ATTRIBUTES.contains(&attribute) && !uri_allowed(attribute, value) {
        debug!(element, attribute, "dropping disallowed uri");
        return None;
    }
    Some(Cow::Borrowed(value))
}

/// A value passes when it has an allowed scheme or no scheme at all.
///
/// Browsers ignore embedded tabs and newlines in URLs, so they are removed
/// before looking for the scheme.
fn uri_allowed(attribute: &str, value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let Some(first) = compact.chars().next() else {
        return true;
    };
    if !first.is_ascii_alphabetic() {
        return true;
    }
    let scheme_end =
        compact.find(|c: char| !(c.is_ascii_alphabetic() || matches!(c, '+' | '.' | '-')));
    match scheme_end {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = &compact[..end];
            if scheme == "data" {
                // Inline images only; data documents are not navigable.
                attribute == "src"
            } else {
                ALLOWED_URI_SCHEMES.contains(&scheme)
            }
        }
        _ => true,
    }
}

/// Escapes a plain-text body and links its URLs, then runs the result
/// through [`sanitize`] so the anchor rules apply to generated links too.
pub fn plain_text_to_html(text: &str) -> SanitizedHtml {
    let text = text.replace("\r\n", "\n");
    if text.trim().is_empty() {
        return SanitizedHtml::default();
    }

    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);

    let mut markup = String::with_capacity(text.len() + 16);
    markup.push_str("<div>");
    for span in finder.spans(&text) {
        match span.kind() {
            Some(LinkKind::Url) => {
                markup.push_str("<a href=\"");
                markup.push_str(&html_escape::encode_double_quoted_attribute(span.as_str()));
                markup.push_str("\">");
                markup.push_str(&html_escape::encode_text(span.as_str()));
                markup.push_str("</a>");
            }
            _ => {
                let escaped = html_escape::encode_text(span.as_str());
                markup.push_str(&escaped.replace('\n', "<br>"));
            }
        }
    }
    markup.push_str("</div>");
    sanitize(&markup)
}

/// Reading-pane content: the HTML part when present, else the text body,
/// else the listing preview.
pub fn render_body(email: &Email) -> SanitizedHtml {
    if let Some(html) = email.html_body.as_deref().filter(|h| !h.trim().is_empty()) {
        return sanitize(html);
    }
    let text = email
        .body
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(email.preview.as_str());
    plain_text_to_html(text)
}
