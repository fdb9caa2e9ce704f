//! Lexers for editable-region markup using logos
//!
//! Two passes: [`MarkupToken`] splits a fragment into whole tags, entities
//! and text; [`TagToken`] then splits a single tag into its name and
//! attributes.

use logos::Logos;
use std::fmt;

/// Top-level tokens of an HTML fragment
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken<'src> {
    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(
        r#"<[a-zA-Z][a-zA-Z0-9-]*(\s+[^\s"'<>/=]+(\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*\s*/?>"#,
        |lex| lex.slice()
    )]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*\s*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim()
    })]
    CloseTag(&'src str),

    #[regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);", |lex| lex.slice())]
    Entity(&'src str),

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for MarkupToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupToken::Comment => write!(f, "comment"),
            MarkupToken::OpenTag(s) => write!(f, "open tag {}", s),
            MarkupToken::CloseTag(s) => write!(f, "close tag </{}>", s),
            MarkupToken::Entity(s) => write!(f, "entity {}", s),
            MarkupToken::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokens inside a single open tag
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"\s+")]
pub enum TagToken<'src> {
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", |lex| &lex.slice()[1..])]
    Name(&'src str),

    #[regex(r#"[^\s"'<>/=]+"#, |lex| lex.slice())]
    Word(&'src str),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoted(&'src str),

    #[token("/>")]
    SelfClose,

    #[token("/")]
    Slash,

    #[token(">")]
    End,
}

/// A parsed open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub name: String,
    /// Raw values; entities are not decoded yet
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Split an open tag matched by [`MarkupToken::OpenTag`].
pub fn lex_open_tag(source: &str) -> OpenTag {
    let mut tag = OpenTag {
        name: String::new(),
        attributes: Vec::new(),
        self_closing: false,
    };
    let mut pending: Option<String> = None;
    let mut expect_value = false;

    for token in TagToken::lexer(source).flatten() {
        match token {
            TagToken::Name(name) => tag.name = name.to_ascii_lowercase(),
            TagToken::Word(word) if expect_value => {
                if let Some(name) = pending.take() {
                    tag.attributes.push((name, word.to_string()));
                }
                expect_value = false;
            }
            TagToken::Word(word) => {
                if let Some(name) = pending.replace(word.to_ascii_lowercase()) {
                    tag.attributes.push((name, String::new()));
                }
            }
            TagToken::Equals => expect_value = pending.is_some(),
            TagToken::DoubleQuoted(value) | TagToken::SingleQuoted(value) => {
                if let Some(name) = pending.take() {
                    tag.attributes.push((name, value.to_string()));
                }
                expect_value = false;
            }
            TagToken::SelfClose => tag.self_closing = true,
            TagToken::Slash | TagToken::End => {}
        }
    }
    if let Some(name) = pending {
        tag.attributes.push((name, String::new()));
    }
    tag
}
