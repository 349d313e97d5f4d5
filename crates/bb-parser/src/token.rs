use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::{CLOSE, OPEN, SLASH};

/// All types of tokens.
///
/// Tokens are units of of bbcode text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Token {
    /// Plain text.
    Text(String),

    /// Tag head.
    StartTag(TagHead),

    /// Tag tail.
    EndTag(TagTail),
}

/// Tag head.
///
/// `[$name]`, `[$name=$attr]`, `[$name="$attr"]` or `[$name $key="$value" ...]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagHead {
    /// Tag name.
    pub name: String,

    /// Attributes found in the head.
    pub attributes: Attributes,

    /// The head exactly as it appeared in source, brackets included.
    pub raw: String,
}

/// Tag tail.
///
/// `[/$name]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagTail {
    /// Tag name.
    pub name: String,
}

impl Token {
    /// Tag name of head and tail tokens.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Text(_) => None,
            Token::StartTag(head) => Some(head.name.as_str()),
            Token::EndTag(tail) => Some(tail.name.as_str()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Token::Text(_))
    }

    /// The token as it was written in source.
    pub fn to_literal(&self) -> Cow<'_, str> {
        match self {
            Token::Text(content) => Cow::Borrowed(content),
            Token::StartTag(head) => Cow::Borrowed(&head.raw),
            Token::EndTag(tail) => Cow::Owned(tail.to_literal()),
        }
    }

    /// Demote the token into [Token::Text] holding its literal form.
    pub fn into_text(self) -> Token {
        match self {
            Token::Text(_) => self,
            Token::StartTag(head) => Token::Text(head.raw),
            Token::EndTag(tail) => Token::Text(tail.to_literal()),
        }
    }
}

impl TagTail {
    pub fn to_literal(&self) -> String {
        format!("{OPEN}{SLASH}{}{CLOSE}", self.name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(content) => write!(f, "{content} (Text)"),
            Token::StartTag(head) => write!(f, "{} (StartTag)", head.name),
            Token::EndTag(tail) => write!(f, "{} (EndTag)", tail.name),
        }
    }
}

/// Attributes carried by a tag head.
///
/// The unnamed attribute in `[size=2]` is the default value of the tag, looking it up by the
/// tag's own name returns it:
///
/// ```
/// # use bb_parser::Attributes;
/// let mut attributes = Attributes::new("size");
/// attributes.set_default("2");
/// assert_eq!(attributes.get("size"), Some("2"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Name of the tag owning the attributes, the key of the default value.
    #[serde(skip)]
    tag: String,

    /// Unnamed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,

    /// Named values.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    named: BTreeMap<String, String>,
}

impl Attributes {
    /// Empty attributes of tag `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            default: None,
            named: BTreeMap::new(),
        }
    }

    /// The unnamed value, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Set the unnamed value, replacing the previous one.
    pub fn set_default(&mut self, value: impl Into<String>) {
        self.default = Some(value.into());
    }

    /// Set a named value, replacing the previous one with the same key.
    ///
    /// A key equal to the tag name sets the default value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == self.tag {
            self.set_default(value);
        } else {
            self.named.insert(key, value.into());
        }
    }

    /// Look up a value by key.
    ///
    /// A key equal to the tag name returns the default value.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == self.tag {
            self.default_value()
        } else {
            self.named.get(key).map(String::as_str)
        }
    }

    pub fn len(&self) -> usize {
        self.named.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.named.is_empty()
    }

    /// Iterate over all `(key, value)` pairs, the default value first under the tag name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.default
            .as_deref()
            .map(|value| (self.tag.as_str(), value))
            .into_iter()
            .chain(
                self.named
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            )
    }
}
