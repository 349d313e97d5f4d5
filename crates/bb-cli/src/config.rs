use crate::cmd::VocabularyArgs;
use anyhow::{Context, Result};
use bb_parser::{Parser, ParserOptions, Vocabulary, VocabularyConfig};
use tokio::fs;
use tracing::trace;

/// Load the tags config file at `path`.
pub(crate) async fn load_vocabulary_config(path: &str) -> Result<VocabularyConfig> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("when reading tags file {path}"))?;
    let config: VocabularyConfig = toml::from_str(data.as_str()).context("invalid tags file")?;
    trace!("{config:#?}");
    Ok(config)
}

/// Build the parser described by command line args.
///
/// Without a tags file, the standard vocabulary and default options are used.
pub(crate) async fn load_parser(args: &VocabularyArgs) -> Result<Parser> {
    let (vocabulary, mut options) = match &args.tags {
        Some(path) => {
            let config = load_vocabulary_config(path).await?;
            (config.vocabulary(), config.options())
        }
        None => (Vocabulary::standard(), ParserOptions::default()),
    };

    if let Some(max_depth) = args.max_depth {
        options = ParserOptions::with_max_depth(max_depth);
    }

    trace!(
        "loaded {} tags, max depth {}",
        vocabulary.len(),
        options.max_depth
    );
    Ok(Parser::with_options(vocabulary, options))
}
