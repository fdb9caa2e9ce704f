//! # Leaf Markup
//!
//! `build_markup` turns a leaf into the HTML its editable region shows;
//! `read_leaf_body` reads an edited region back into a leaf body.
//!
//! ## Rules
//!
//! - Body precedence: `lines` > `children` > `content`
//! - A run's class list is `bold`, `italic`, `underline` (in that order)
//!   followed by its custom class
//! - A link wraps the text in `<a href>`; a class list or element type wraps
//!   the result in `<span class data-type>`
//! - Lines are joined with `<br>`
//!
//! Output is deterministic and uses the same escaping as
//! [`Dom::inner_html`], so an unchanged region compares equal as a string.

use crate::dom::{Dom, DomData, DomKey, DomResult};
use crate::markup_lexer::{lex_open_tag, MarkupToken};
use logos::Logos;
use strata_model::{InlineRun, LeafBody, Line, TextNode};

const READ_ONLY_LINK_ATTRS: &str = r#" target="_blank" rel="noopener noreferrer""#;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value)
}

/// Decode one entity such as `&amp;` or `&#x27;`. Unknown names are kept
/// verbatim.
pub fn decode_entity(entity: &str) -> String {
    let name = entity.trim_start_matches('&').trim_end_matches(';');
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }),
    };
    decoded.map(String::from).unwrap_or_else(|| entity.to_string())
}

/// Decode every entity in `text`.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut lexer = MarkupToken::lexer(text);
    while let Some(token) = lexer.next() {
        match token {
            Ok(MarkupToken::Entity(entity)) => out.push_str(&decode_entity(entity)),
            _ => out.push_str(lexer.slice()),
        }
    }
    out
}

/// Parse `html` and append the resulting nodes to `parent`.
///
/// Lenient like a browser: stray `<`/`&` are text, unmatched close tags are
/// dropped, unclosed elements end with the fragment.
pub fn parse_into(dom: &mut Dom, parent: DomKey, html: &str) -> DomResult<()> {
    let mut stack = vec![parent];

    for (token, span) in MarkupToken::lexer(html).spanned() {
        let top = stack.last().copied().unwrap_or(parent);
        match token {
            Ok(MarkupToken::OpenTag(source)) => {
                let tag = lex_open_tag(source);
                let element = dom.create_element(tag.name.as_str());
                for (name, value) in &tag.attributes {
                    dom.set_attribute(element, name.as_str(), unescape(value))?;
                }
                dom.append_child(top, element)?;
                if !tag.self_closing && !is_void_element(&tag.name) {
                    stack.push(element);
                }
            }
            Ok(MarkupToken::CloseTag(name)) => {
                let name = name.to_ascii_lowercase();
                if let Some(depth) = stack
                    .iter()
                    .skip(1)
                    .rposition(|k| dom.tag(*k) == Some(name.as_str()))
                {
                    stack.truncate(depth + 1);
                }
            }
            Ok(MarkupToken::Entity(entity)) => append_text(dom, top, &decode_entity(entity))?,
            Ok(MarkupToken::Text(text)) => append_text(dom, top, text)?,
            Ok(MarkupToken::Comment) => {}
            Err(()) => append_text(dom, top, &html[span])?,
        }
    }
    Ok(())
}

/// Append text, merging with a trailing text node.
fn append_text(dom: &mut Dom, parent: DomKey, text: &str) -> DomResult<()> {
    if let Some(&last) = dom.children(parent).last() {
        if let Some(existing) = dom.text(last) {
            let merged = format!("{existing}{text}");
            return dom.set_text(last, merged);
        }
    }
    let node = dom.create_text(text);
    dom.append_child(parent, node)
}

/// Markup for a leaf's editable region.
pub fn build_markup(node: &TextNode, read_only: bool) -> String {
    body_markup(&node.body(), read_only)
}

pub fn body_markup(body: &LeafBody, read_only: bool) -> String {
    match body {
        LeafBody::Content(text) => escape_text(text),
        LeafBody::Runs(runs) => runs_markup(runs, read_only),
        LeafBody::Lines(lines) => lines
            .iter()
            .map(|line| line_markup(line, read_only))
            .collect::<Vec<_>>()
            .join("<br>"),
    }
}

fn line_markup(line: &Line, read_only: bool) -> String {
    match &line.children {
        Some(runs) if !runs.is_empty() => runs_markup(runs, read_only),
        _ => escape_text(line.content.as_deref().unwrap_or_default()),
    }
}

fn runs_markup(runs: &[InlineRun], read_only: bool) -> String {
    runs.iter().map(|run| run_markup(run, read_only)).collect()
}

/// Classes for a run, in a fixed order.
pub fn run_classes(run: &InlineRun) -> Vec<&str> {
    let mut classes = Vec::new();
    if run.bold {
        classes.push("bold");
    }
    if run.italic {
        classes.push("italic");
    }
    if run.underline {
        classes.push("underline");
    }
    if let Some(custom) = run.class_name.as_deref().filter(|c| !c.is_empty()) {
        classes.push(custom);
    }
    classes
}

pub fn run_markup(run: &InlineRun, read_only: bool) -> String {
    let mut html = escape_text(&run.content);

    if let Some(href) = &run.href {
        let extra = if read_only { READ_ONLY_LINK_ATTRS } else { "" };
        html = format!(r#"<a href="{}"{extra}>{html}</a>"#, escape_attr(href));
    }

    let classes = run_classes(run);
    if !classes.is_empty() || run.element_type.is_some() {
        let mut open = String::from("<span");
        if !classes.is_empty() {
            open.push_str(&format!(r#" class="{}""#, escape_attr(&classes.join(" "))));
        }
        if let Some(element_type) = &run.element_type {
            open.push_str(&format!(r#" data-type="{}""#, escape_attr(element_type)));
        }
        html = format!("{open}>{html}</span>");
    }

    html
}

/// Formatting in effect while walking the region.
#[derive(Debug, Clone, Default)]
struct Format {
    bold: bool,
    italic: bool,
    underline: bool,
    classes: Vec<String>,
    href: Option<String>,
    element_type: Option<String>,
}

impl Format {
    fn enter(&self, dom: &Dom, element: DomKey, tag: &str) -> Format {
        let mut next = self.clone();
        match tag {
            "b" | "strong" => next.bold = true,
            "i" | "em" => next.italic = true,
            "u" => next.underline = true,
            "a" => next.href = dom.attribute(element, "href").map(str::to_string),
            _ => {}
        }
        if let Some(class) = dom.attribute(element, "class") {
            for token in class.split_whitespace() {
                match token {
                    "bold" => next.bold = true,
                    "italic" => next.italic = true,
                    "underline" => next.underline = true,
                    custom => next.classes.push(custom.to_string()),
                }
            }
        }
        if let Some(element_type) = dom.attribute(element, "data-type") {
            next.element_type = Some(element_type.to_string());
        }
        next
    }

    fn run(&self, text: &str) -> InlineRun {
        InlineRun {
            content: text.to_string(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            class_name: (!self.classes.is_empty()).then(|| self.classes.join(" ")),
            href: self.href.clone(),
            element_type: self.element_type.clone(),
        }
    }
}

struct BodyReader<'a> {
    dom: &'a Dom,
    lines: Vec<Vec<InlineRun>>,
}

impl BodyReader<'_> {
    fn current(&mut self) -> &mut Vec<InlineRun> {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn push_text(&mut self, text: &str, format: &Format) {
        if text.is_empty() {
            return;
        }
        let run = format.run(text);
        let line = self.current();
        match line.last_mut() {
            Some(prev) if prev.same_format(&run) => prev.content.push_str(text),
            _ => line.push(run),
        }
    }

    fn walk(&mut self, key: DomKey, format: &Format) {
        let dom = self.dom;
        match dom.data(key) {
            Some(DomData::Text(text)) => self.push_text(text, format),
            Some(DomData::Element { tag, .. }) => {
                if tag == "br" {
                    self.current();
                    self.lines.push(Vec::new());
                    return;
                }
                // block wrappers inserted by the browser on enter
                let block = matches!(tag.as_str(), "div" | "p");
                if block && self.lines.last().is_some_and(|l| !l.is_empty()) {
                    self.lines.push(Vec::new());
                }
                let inner = format.enter(dom, key, tag);
                for child in dom.children(key) {
                    self.walk(*child, &inner);
                }
            }
            None => {}
        }
    }
}

/// Read the body of an edited region.
///
/// `<br>` splits lines. A single unformatted run collapses to plain content.
pub fn read_leaf_body(dom: &Dom, element: DomKey) -> LeafBody {
    let mut reader = BodyReader {
        dom,
        lines: Vec::new(),
    };
    let base = Format::default();
    for child in dom.children(element) {
        reader.walk(*child, &base);
    }

    let mut lines = reader.lines;
    if lines.len() > 1 {
        return LeafBody::Lines(
            lines
                .into_iter()
                .map(|runs| match runs.as_slice() {
                    [] => Line::plain(""),
                    [only] if only.is_unformatted() => Line::plain(only.content.clone()),
                    _ => Line::runs(runs),
                })
                .collect(),
        );
    }

    let runs = lines.pop().unwrap_or_default();
    match runs.as_slice() {
        [] => LeafBody::Content(String::new()),
        [only] if only.is_unformatted() => LeafBody::Content(only.content.clone()),
        _ => LeafBody::Runs(runs),
    }
}
