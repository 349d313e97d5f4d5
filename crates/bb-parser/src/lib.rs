use std::sync::Arc;
use tracing::trace;

mod error;
pub mod lexer;
pub mod tag;
pub mod token;
pub mod tree;

pub use error::StructureError;
pub use lexer::{lex, Lexer};
pub use tag::{BBTag, TagConfig, Vocabulary, VocabularyConfig};
pub use token::{Attributes, TagHead, TagTail, Token};
pub use tree::{ParseTree, ParserOptions, TreeBuilder, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};

const OPEN: char = '[';
const CLOSE: char = ']';
const SLASH: char = '/';
const EQUAL: char = '=';

/// Turn bbcode text into [ParseTree] with a fixed [Vocabulary].
///
/// The parser holds no state between calls, share one across threads to parse in parallel.
#[derive(Clone, Debug)]
pub struct Parser {
    vocabulary: Arc<Vocabulary>,
    options: ParserOptions,
}

impl Parser {
    pub fn new(vocabulary: impl Into<Arc<Vocabulary>>) -> Self {
        Self::with_options(vocabulary, ParserOptions::default())
    }

    pub fn with_options(vocabulary: impl Into<Arc<Vocabulary>>, options: ParserOptions) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            options,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Normalized tokens of `source`.
    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        Lexer::new(&self.vocabulary).tokenize(source)
    }

    /// Parse `source` into a tree.
    ///
    /// Unrecognized tags are kept as text. Fails when recognized tags are unbalanced.
    pub fn parse(&self, source: &str) -> Result<ParseTree, StructureError> {
        let tokens = self.tokenize(source);
        trace!("building tree from {} tokens", tokens.len());
        TreeBuilder::new(self.options).build(source, tokens)
    }

    /// Check `source` parses into a valid tree.
    pub fn is_valid(&self, source: &str) -> bool {
        self.parse(source).is_ok_and(|tree| tree.is_valid())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Vocabulary::standard())
    }
}

/// Parse `data` with [Vocabulary::standard].
pub fn parse_bbcode(data: impl AsRef<str>) -> Result<ParseTree, StructureError> {
    Parser::default().parse(data.as_ref())
}
