use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::tag::Vocabulary;
use crate::token::{Attributes, TagHead, TagTail, Token};
use crate::EQUAL;

/// Characters allowed in attribute names.
const ATTR_NAME: &str = r"[a-zA-Z0-9._:;/\-]";

/// Characters allowed in quoted attribute values.
const ATTR_VALUE: &str = r"[a-zA-Z0-9._:;#/\s\-]";

/// Regex to match a tag tail `[/name]` or a tag head `[name]`, `[name=value]`,
/// `[name="value"]` and `[name key="value" ...]`.
static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Regex to match each `key="value"` pair in the attribute part of a tag head.
static ATTR_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(&format!(
            r#"\[/(?<tail>\w+)\]|\[(?<head>\w+)(?<default>="{ATTR_VALUE}*"|=[^\s\[\]"]+)?(?<attrs>(?: {ATTR_NAME}*="{ATTR_VALUE}+")*)\]"#
        ))
        .expect("invalid tag pattern")
    })
}

fn attr_re() -> &'static Regex {
    ATTR_RE.get_or_init(|| {
        Regex::new(&format!(
            r#"(?<key>{ATTR_NAME}+)?="(?<value>{ATTR_VALUE}+)""#
        ))
        .expect("invalid attribute pattern")
    })
}

/// Split `source` into text, tag head and tag tail tokens.
///
/// Every tag-like structure becomes a tag token, no matter if recognized or not. Concatenating
/// the literal form of all tokens gives back `source`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut last = 0;

    for captures in tag_re().captures_iter(source) {
        let Some(tag) = captures.get(0) else {
            continue;
        };

        if tag.start() > last {
            tokens.push(Token::Text(source[last..tag.start()].to_string()));
        }
        tokens.push(collect_tag(&captures, tag.as_str()));
        last = tag.end();
    }

    if last < source.len() {
        tokens.push(Token::Text(source[last..].to_string()));
    }

    tokens
}

/// Build a head or tail token from a match of [tag_re].
fn collect_tag(captures: &Captures<'_>, raw: &str) -> Token {
    if let Some(tail) = captures.name("tail") {
        return Token::EndTag(TagTail {
            name: tail.as_str().to_string(),
        });
    }

    let Some(name) = captures.name("head").map(|x| x.as_str()) else {
        return Token::Text(raw.to_string());
    };

    let mut attributes = Attributes::new(name);
    if let Some(default) = captures.name("default") {
        // Skip the leading `=`, the value is quoted or not.
        let value = default.as_str();
        let value = value.strip_prefix(EQUAL).unwrap_or(value);
        let value = value
            .strip_prefix('"')
            .and_then(|x| x.strip_suffix('"'))
            .unwrap_or(value);
        attributes.set_default(value);
    }
    if let Some(attrs) = captures.name("attrs") {
        for pair in attr_re().captures_iter(attrs.as_str()) {
            let Some(value) = pair.name("value").map(|x| x.as_str()) else {
                continue;
            };
            match pair.name("key") {
                Some(key) => attributes.insert(key.as_str(), value),
                // `[name ="value"]`, still the default one.
                None => attributes.set_default(value),
            }
        }
    }

    Token::StartTag(TagHead {
        name: name.to_string(),
        attributes,
        raw: raw.to_string(),
    })
}

/// State when normalizing tokens.
enum Mode {
    /// Tags are tags.
    Normal,

    /// Inside a no-nesting tag, everything is text until tail of `tag` appears.
    Absorbing { tag: String, buffer: String },
}

/// Produce tokens against a [Vocabulary].
pub struct Lexer<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> Lexer<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Lex and normalize `source`.
    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        let tokens = lex(source);
        trace!("lexed {} tokens", tokens.len());
        self.normalize(tokens)
    }

    /// Rewrite tokens from [lex] so that:
    ///
    /// * Heads and tails of tags not in the vocabulary become text.
    /// * The body of a no-nesting tag becomes a single text token.
    ///
    /// A no-nesting tag never closed takes all tokens after it as its body.
    pub fn normalize(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut mode = Mode::Normal;

        for token in tokens {
            mode = match mode {
                Mode::Absorbing { tag, mut buffer } => match token {
                    Token::EndTag(tail) if tail.name == tag => {
                        output.push(Token::Text(buffer));
                        output.push(Token::EndTag(tail));
                        Mode::Normal
                    }
                    other => {
                        buffer.push_str(&other.to_literal());
                        Mode::Absorbing { tag, buffer }
                    }
                },
                Mode::Normal => self.normalize_token(token, &mut output),
            };
        }

        if let Mode::Absorbing { tag, buffer } = mode {
            debug!("no-nesting tag [{tag}] not closed, take the rest as its content");
            if !buffer.is_empty() {
                output.push(Token::Text(buffer));
            }
        }

        output
    }

    /// Handle a token outside of any no-nesting tag, return the next mode.
    fn normalize_token(&self, token: Token, output: &mut Vec<Token>) -> Mode {
        let Some(name) = token.name() else {
            output.push(token);
            return Mode::Normal;
        };

        let Some(tag) = self.vocabulary.get(name) else {
            debug!("unrecognized tag {name:?}, fallback to text");
            output.push(token.into_text());
            return Mode::Normal;
        };

        let mode = match token {
            Token::StartTag(_) if tag.no_nesting => Mode::Absorbing {
                tag: tag.name.clone(),
                buffer: String::new(),
            },
            _ => Mode::Normal,
        };
        output.push(token);
        mode
    }
}
