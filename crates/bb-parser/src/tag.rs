use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::tree::ParserOptions;

/// A bbcode tag known to the parser.
///
/// `[$name]...[/$name]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BBTag {
    /// Tag name, exactly as written between the brackets.
    pub name: String,

    /// Content between the head and tail is never parsed as bbcode.
    ///
    /// Like `[code]` where `[b]` inside is only text.
    pub no_nesting: bool,

    /// Attribute names expected on this tag.
    ///
    /// Advisory only: tokens carrying other attributes are still accepted.
    pub allowed_attributes: BTreeSet<String>,
}

impl BBTag {
    /// Construct a plain tag that allows nesting and has no attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            no_nesting: false,
            allowed_attributes: BTreeSet::new(),
        }
    }

    /// Mark the tag as no-nesting.
    pub fn no_nesting(mut self) -> Self {
        self.no_nesting = true;
        self
    }

    /// Set the attribute names expected on the tag.
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether `attribute` is listed as expected on this tag.
    pub fn allows_attribute(&self, attribute: &str) -> bool {
        self.allowed_attributes.contains(attribute)
    }
}

/// The set of tags recognized in parsing.
///
/// Built once and only read afterwards, share it between parses with an `Arc`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tags: HashMap<String, BBTag>,
}

impl Vocabulary {
    /// Tags commonly available on forums.
    ///
    /// `code`, `pre` and `noparse` are no-nesting. Both `color` and `colour` are accepted.
    pub fn standard() -> Self {
        [
            BBTag::new("b"),
            BBTag::new("i"),
            BBTag::new("u"),
            BBTag::new("s"),
            BBTag::new("samp"),
            BBTag::new("pre").no_nesting(),
            BBTag::new("code").no_nesting(),
            BBTag::new("noparse").no_nesting(),
            BBTag::new("color").with_attributes(["color"]),
            BBTag::new("colour").with_attributes(["colour"]),
            BBTag::new("size").with_attributes(["size"]),
            BBTag::new("url").with_attributes(["url"]),
            BBTag::new("img").with_attributes(["img", "width", "height"]),
            BBTag::new("q").with_attributes(["q"]),
            BBTag::new("blockquote").with_attributes(["blockquote"]),
            BBTag::new("quote").with_attributes(["quote"]),
            BBTag::new("list").with_attributes(["list"]),
            BBTag::new("*"),
        ]
        .into_iter()
        .collect()
    }

    /// Find the tag named `name`.
    ///
    /// Names are compared exactly, `B` is not `b`.
    pub fn get(&self, name: &str) -> Option<&BBTag> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all tags, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &BBTag> {
        self.tags.values()
    }
}

impl FromIterator<BBTag> for Vocabulary {
    fn from_iter<T: IntoIterator<Item = BBTag>>(iter: T) -> Self {
        Self {
            tags: iter
                .into_iter()
                .map(|tag| (tag.name.clone(), tag))
                .collect(),
        }
    }
}

/// Config definition of a vocabulary.
///
/// ```toml
/// max_depth = 64
///
/// [tags.b]
///
/// [tags.code]
/// no_nesting = true
///
/// [tags.url]
/// attributes = ["url"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Deepest tag nesting accepted when building trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// All recognized tags, keyed by tag name.
    #[serde(default)]
    pub tags: BTreeMap<String, TagConfig>,
}

/// Config of a single tag in [VocabularyConfig].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    #[serde(default)]
    pub no_nesting: bool,

    #[serde(default)]
    pub attributes: Vec<String>,
}

impl VocabularyConfig {
    /// Build the [Vocabulary] described by the config.
    pub fn vocabulary(&self) -> Vocabulary {
        self.tags
            .iter()
            .map(|(name, config)| BBTag {
                name: name.clone(),
                no_nesting: config.no_nesting,
                allowed_attributes: config.attributes.iter().cloned().collect(),
            })
            .collect()
    }

    /// Parser options described by the config, defaults for anything not set.
    ///
    /// `max_depth` is clamped to [crate::MAX_DEPTH_LIMIT].
    pub fn options(&self) -> ParserOptions {
        match self.max_depth {
            Some(max_depth) => ParserOptions::with_max_depth(max_depth),
            None => ParserOptions::default(),
        }
    }
}

impl From<&Vocabulary> for VocabularyConfig {
    fn from(vocabulary: &Vocabulary) -> Self {
        Self {
            max_depth: None,
            tags: vocabulary
                .iter()
                .map(|tag| {
                    (
                        tag.name.clone(),
                        TagConfig {
                            no_nesting: tag.no_nesting,
                            attributes: tag.allowed_attributes.iter().cloned().collect(),
                        },
                    )
                })
                .collect(),
        }
    }
}
