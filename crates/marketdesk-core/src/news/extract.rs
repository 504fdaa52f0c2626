//! Regex-based headline extraction from raw HTML.

use std::sync::LazyLock;

use regex::Regex;

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor pattern compiles"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern compiles")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern compiles"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").expect("entity pattern compiles"));

/// Which elements carry headlines on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `<a>` with an exact attribute value, e.g. `data-testid="Heading"`.
    Attribute {
        name: &'static str,
        value: &'static str,
    },
    /// `<a>` whose class list contains the token.
    Class(&'static str),
    /// First `<a>` inside a `<tag>` whose class list contains the token.
    NestedAnchor {
        tag: &'static str,
        class: &'static str,
    },
}

/// Headline candidate: decoded text plus the raw href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub href: Option<String>,
}

/// Returns up to `cap` candidates in document order.
pub fn extract_anchors(html: &str, selector: Selector, cap: usize) -> Vec<Anchor> {
    match selector {
        Selector::Attribute { name, value } => anchors_where(html, cap, |attrs| {
            attribute(attrs, name).as_deref() == Some(value)
        }),
        Selector::Class(class) => anchors_where(html, cap, |attrs| has_class(attrs, class)),
        Selector::NestedAnchor { tag, class } => nested_anchors(html, tag, class, cap),
    }
}

fn anchors_where(html: &str, cap: usize, accept: impl Fn(&str) -> bool) -> Vec<Anchor> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            accept(attrs).then(|| anchor_from(attrs, caps.get(2).map_or("", |m| m.as_str())))
        })
        .take(cap)
        .collect()
}

fn nested_anchors(html: &str, tag: &str, class: &str, cap: usize) -> Vec<Anchor> {
    let pattern = format!(r"(?is)<{tag}\b([^>]*)>(.*?)</{tag}\s*>", tag = regex::escape(tag));
    let Ok(container) = Regex::new(&pattern) else {
        return Vec::new();
    };

    container
        .captures_iter(html)
        .filter(|caps| has_class(caps.get(1).map_or("", |m| m.as_str()), class))
        .take(cap)
        .filter_map(|caps| {
            let inner = caps.get(2)?.as_str();
            let anchor = ANCHOR.captures(inner)?;
            Some(anchor_from(
                anchor.get(1).map_or("", |m| m.as_str()),
                anchor.get(2).map_or("", |m| m.as_str()),
            ))
        })
        .collect()
}

fn anchor_from(attrs: &str, inner_html: &str) -> Anchor {
    Anchor {
        text: text_content(inner_html),
        href: attribute(attrs, "href")
            .map(|href| decode_entities(&href))
            .filter(|href| !href.is_empty()),
    }
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_owned())
    })
}

fn has_class(attrs: &str, class: &str) -> bool {
    attribute(attrs, "class")
        .map(|value| value.split_ascii_whitespace().any(|token| token == class))
        .unwrap_or(false)
}

/// Strips markup, decodes entities and trims.
pub fn text_content(inner_html: &str) -> String {
    let stripped = TAG.replace_all(inner_html, "");
    decode_entities(&stripped).trim().to_owned()
}

pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }

    let numeric = NUMERIC_ENTITY.replace_all(input, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_owned())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
