/// Reasons a token stream can not form a balanced tree.
///
/// The whole document is invalid once any of these occurs, callers decide the fallback like
/// showing the source as plain text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// Input ended with tag `name` still open.
    #[error("tag [{name}] is never closed")]
    UnclosedTag { name: String },

    /// Tail of tag `found` appeared when tag `expected` is the innermost open one.
    #[error("expected [/{expected}] but found [/{found}]")]
    MismatchedEndTag { expected: String, found: String },

    /// Tail of tag `name` appeared with no tag open.
    #[error("unexpected [/{name}] outside of any tag")]
    UnexpectedEndTag { name: String },

    /// Tags nested deeper than `limit` levels.
    #[error("tags nested deeper than {limit} levels")]
    DepthExceeded { limit: usize },
}
