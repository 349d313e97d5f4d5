use serde::Serialize;
use std::{fmt, mem};
use tracing::{debug, trace};

use crate::error::StructureError;
use crate::token::{Attributes, TagHead, TagTail, Token};

/// Deepest tag nesting accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Hard upper bound of [ParserOptions::max_depth], larger values are clamped to it.
///
/// Printing and serializing a tree still recurse once per tag level.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Options applied when building trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum count of tags open at the same time.
    ///
    /// Opening one more fails the build with [StructureError::DepthExceeded]. Never exceeds
    /// [MAX_DEPTH_LIMIT] when building.
    pub max_depth: usize,
}

impl ParserOptions {
    /// Options with `max_depth` clamped to [MAX_DEPTH_LIMIT].
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    /// The depth limit applied when building.
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parsed bbcode document.
///
/// The root holds the source text and all top level nodes. Each node is owned by its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ParseTree {
    /// Document root.
    Root {
        source: String,
        children: Vec<ParseTree>,
    },

    /// Plain text.
    Text(String),

    /// A recognized tag and everything between its head and tail.
    Tag {
        name: String,
        attributes: Attributes,
        children: Vec<ParseTree>,
    },
}

impl ParseTree {
    /// Empty root of `source`.
    pub fn root(source: impl Into<String>) -> Self {
        ParseTree::Root {
            source: source.into(),
            children: vec![],
        }
    }

    /// Direct children, always empty on text.
    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Root { children, .. } | ParseTree::Tag { children, .. } => {
                children.as_slice()
            }
            ParseTree::Text(_) => &[],
        }
    }

    /// Tag name of [ParseTree::Tag].
    pub fn name(&self) -> Option<&str> {
        match self {
            ParseTree::Tag { name, .. } => Some(name.as_str()),
            ParseTree::Root { .. } | ParseTree::Text(_) => None,
        }
    }

    /// Attributes of [ParseTree::Tag].
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            ParseTree::Tag { attributes, .. } => Some(attributes),
            ParseTree::Root { .. } | ParseTree::Text(_) => None,
        }
    }

    /// Check the tree is well formed.
    ///
    /// A node without children is valid, a node with children is valid if all children are.
    /// A child can not be a root and a tag must have a name.
    pub fn is_valid(&self) -> bool {
        let mut pending = self.children().iter().collect::<Vec<_>>();
        while let Some(node) = pending.pop() {
            match node {
                ParseTree::Root { .. } => return false,
                ParseTree::Text(_) => {}
                ParseTree::Tag { name, children, .. } => {
                    if name.is_empty() {
                        return false;
                    }
                    pending.extend(children.iter());
                }
            }
        }
        true
    }

    /// All text in the tree in document order, tags stripped.
    pub fn text_content(&self) -> String {
        let mut content = String::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                ParseTree::Text(text) => content.push_str(text),
                ParseTree::Root { children, .. } | ParseTree::Tag { children, .. } => {
                    pending.extend(children.iter().rev())
                }
            }
        }
        content
    }

    /// All tags named `name` in document order.
    pub fn find_tags<'a>(&'a self, name: &str) -> Vec<&'a ParseTree> {
        let mut found = vec![];
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.name() == Some(name) {
                found.push(node);
            }
            pending.extend(node.children().iter().rev());
        }
        found
    }

    /// Count of tag levels, `0` if there is no tag.
    pub fn depth(&self) -> usize {
        let mut max: usize = 0;
        let mut pending = vec![(self, 0_usize)];
        while let Some((node, level)) = pending.pop() {
            let level = match node {
                ParseTree::Tag { .. } => level + 1,
                ParseTree::Root { .. } | ParseTree::Text(_) => level,
            };
            max = max.max(level);
            pending.extend(node.children().iter().map(|child| (child, level)));
        }
        max
    }
}

impl Drop for ParseTree {
    fn drop(&mut self) {
        // Flatten descendants onto the heap so dropping never recurses per level.
        let mut pending = match self {
            ParseTree::Root { children, .. } | ParseTree::Tag { children, .. } => {
                mem::take(children)
            }
            ParseTree::Text(_) => return,
        };
        while let Some(mut node) = pending.pop() {
            if let ParseTree::Root { children, .. } | ParseTree::Tag { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTree::Root { source, .. } => write!(f, "Root - {source}"),
            ParseTree::Text(text) => write!(f, "Text - {text}"),
            ParseTree::Tag { name, .. } => write!(f, "Tag - {name}"),
        }
    }
}

/// An open tag waiting for its tail.
struct Frame {
    name: String,
    attributes: Attributes,
    children: Vec<ParseTree>,
}

/// Build [ParseTree] from normalized tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilder {
    options: ParserOptions,
}

impl TreeBuilder {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Build the tree of `source` from its normalized `tokens`.
    ///
    /// Each head opens a tag that must be closed by a tail with the same name before the tag
    /// enclosing it closes, otherwise the whole build fails.
    pub fn build(
        &self,
        source: impl Into<String>,
        tokens: Vec<Token>,
    ) -> Result<ParseTree, StructureError> {
        // Pop from the back gives the next token in document order.
        let mut tokens = tokens;
        tokens.reverse();

        let max_depth = self.options.effective_max_depth();
        let mut root = vec![];
        let mut open: Vec<Frame> = vec![];

        while let Some(token) = tokens.pop() {
            match token {
                Token::Text(text) => push_child(&mut open, &mut root, ParseTree::Text(text)),
                Token::StartTag(TagHead {
                    name, attributes, ..
                }) => {
                    if open.len() >= max_depth {
                        debug!("tag [{name}] exceeds max depth {max_depth}");
                        return Err(StructureError::DepthExceeded { limit: max_depth });
                    }
                    open.push(Frame {
                        name,
                        attributes,
                        children: vec![],
                    });
                }
                Token::EndTag(TagTail { name }) => {
                    let Some(frame) = open.pop() else {
                        return Err(StructureError::UnexpectedEndTag { name });
                    };
                    if frame.name != name {
                        return Err(StructureError::MismatchedEndTag {
                            expected: frame.name,
                            found: name,
                        });
                    }
                    let node = ParseTree::Tag {
                        name: frame.name,
                        attributes: frame.attributes,
                        children: frame.children,
                    };
                    push_child(&mut open, &mut root, node);
                }
            }
        }

        if let Some(frame) = open.pop() {
            return Err(StructureError::UnclosedTag { name: frame.name });
        }

        trace!("built tree with {} top level nodes", root.len());
        Ok(ParseTree::Root {
            source: source.into(),
            children: root,
        })
    }
}

/// Attach `node` to the innermost open tag, or the root when no tag is open.
fn push_child(open: &mut [Frame], root: &mut Vec<ParseTree>, node: ParseTree) {
    match open.last_mut() {
        Some(frame) => frame.children.push(node),
        None => root.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Token {
        Token::Text(content.to_string())
    }

    fn head(name: &str) -> Token {
        Token::StartTag(TagHead {
            name: name.to_string(),
            attributes: Attributes::new(name),
            raw: format!("[{name}]"),
        })
    }

    fn tail(name: &str) -> Token {
        Token::EndTag(TagTail {
            name: name.to_string(),
        })
    }

    fn tag(name: &str, children: Vec<ParseTree>) -> ParseTree {
        ParseTree::Tag {
            name: name.to_string(),
            attributes: Attributes::new(name),
            children,
        }
    }

    fn build(tokens: Vec<Token>) -> Result<ParseTree, StructureError> {
        TreeBuilder::default().build("src", tokens)
    }

    #[test]
    fn test_build_empty() {
        let tree = build(vec![]).unwrap();
        assert_eq!(tree, ParseTree::root("src"));
        assert!(tree.is_valid());
    }

    #[test]
    fn test_build_nested() {
        let tree = build(vec![
            text("a"),
            head("b"),
            head("i"),
            text("x"),
            tail("i"),
            text("y"),
            tail("b"),
        ])
        .unwrap();

        assert_eq!(
            tree.children(),
            &[
                ParseTree::Text("a".into()),
                tag(
                    "b",
                    vec![
                        tag("i", vec![ParseTree::Text("x".into())]),
                        ParseTree::Text("y".into())
                    ]
                ),
            ]
        );
        assert!(tree.is_valid());
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.text_content(), "axy");
    }

    #[test]
    fn test_build_empty_tag() {
        let tree = build(vec![head("b"), tail("b")]).unwrap();
        assert_eq!(tree.children(), &[tag("b", vec![])]);
    }

    #[test]
    fn test_build_mismatched() {
        assert_eq!(
            build(vec![head("b"), text("x"), tail("i")]),
            Err(StructureError::MismatchedEndTag {
                expected: "b".into(),
                found: "i".into()
            })
        );
    }

    #[test]
    fn test_build_failure_propagates_to_root() {
        // Inner tag broken, outer tag closed properly.
        assert_eq!(
            build(vec![head("b"), head("i"), tail("b"), tail("b")]),
            Err(StructureError::MismatchedEndTag {
                expected: "i".into(),
                found: "b".into()
            })
        );
    }

    #[test]
    fn test_build_unclosed() {
        assert_eq!(
            build(vec![head("b"), head("i"), text("x"), tail("i")]),
            Err(StructureError::UnclosedTag { name: "b".into() })
        );
        assert_eq!(
            build(vec![head("code"), text("abc")]),
            Err(StructureError::UnclosedTag {
                name: "code".into()
            })
        );
    }

    #[test]
    fn test_build_unexpected_tail() {
        assert_eq!(
            build(vec![text("x"), tail("b")]),
            Err(StructureError::UnexpectedEndTag { name: "b".into() })
        );
    }

    #[test]
    fn test_build_depth_limit() {
        let builder = TreeBuilder::new(ParserOptions { max_depth: 2 });

        let ok = vec![head("b"), head("b"), tail("b"), tail("b")];
        assert!(builder.build("", ok).is_ok());

        let too_deep = vec![
            head("b"),
            head("b"),
            head("b"),
            tail("b"),
            tail("b"),
            tail("b"),
        ];
        assert_eq!(
            builder.build("", too_deep),
            Err(StructureError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_build_deep_input_does_not_overflow() {
        let mut tokens = vec![head("b"); 100_000];
        tokens.extend(vec![tail("b"); 100_000]);
        assert_eq!(
            build(tokens),
            Err(StructureError::DepthExceeded {
                limit: DEFAULT_MAX_DEPTH
            })
        );
    }

    #[test]
    fn test_build_depth_is_clamped() {
        let builder = TreeBuilder::new(ParserOptions {
            max_depth: usize::MAX,
        });
        let mut tokens = vec![head("b"); MAX_DEPTH_LIMIT + 1];
        tokens.extend(vec![tail("b"); MAX_DEPTH_LIMIT + 1]);
        assert_eq!(
            builder.build("", tokens),
            Err(StructureError::DepthExceeded {
                limit: MAX_DEPTH_LIMIT
            })
        );

        let mut tokens = vec![head("b"); MAX_DEPTH_LIMIT];
        tokens.extend(vec![tail("b"); MAX_DEPTH_LIMIT]);
        let tree = builder.build("", tokens).unwrap();
        assert_eq!(tree.depth(), MAX_DEPTH_LIMIT);
    }

    #[test]
    fn test_options_with_max_depth() {
        assert_eq!(ParserOptions::with_max_depth(8).max_depth, 8);
        assert_eq!(
            ParserOptions::with_max_depth(usize::MAX).max_depth,
            MAX_DEPTH_LIMIT
        );
    }

    #[test]
    fn test_drop_deep_tree() {
        let mut tree = ParseTree::Text("x".into());
        for _ in 0..1_000_000 {
            tree = tag("b", vec![tree]);
        }
        assert_eq!(tree.depth(), 1_000_000);
        assert_eq!(tree.text_content(), "x");
        drop(tree);
    }

    #[test]
    fn test_is_valid() {
        let tree = ParseTree::Root {
            source: String::new(),
            children: vec![tag("b", vec![ParseTree::root("nested")])],
        };
        assert!(!tree.is_valid());

        let tree = ParseTree::Root {
            source: String::new(),
            children: vec![tag("", vec![])],
        };
        assert!(!tree.is_valid());

        assert!(ParseTree::Text("x".into()).is_valid());
        assert!(tag("b", vec![]).is_valid());
    }

    #[test]
    fn test_find_tags() {
        let tree = build(vec![
            head("b"),
            text("1"),
            tail("b"),
            head("i"),
            head("b"),
            text("2"),
            tail("b"),
            tail("i"),
        ])
        .unwrap();

        let found = tree
            .find_tags("b")
            .into_iter()
            .map(ParseTree::text_content)
            .collect::<Vec<_>>();
        assert_eq!(found, vec!["1", "2"]);
        assert!(tree.find_tags("u").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(ParseTree::root("[b]x[/b]").to_string(), "Root - [b]x[/b]");
        assert_eq!(ParseTree::Text("x".into()).to_string(), "Text - x");
        assert_eq!(tag("b", vec![]).to_string(), "Tag - b");
    }
}
