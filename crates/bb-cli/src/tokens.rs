use crate::cmd::TokensArgs;
use crate::config::load_parser;
use anyhow::{Context, Result};
use tokio::fs;
use tracing::trace;

pub async fn run_tokens_command(args: TokensArgs) -> Result<()> {
    trace!("running tokens command with args: {args:?}");

    let parser = load_parser(&args.vocabulary).await?;
    let content = fs::read_to_string(&args.file)
        .await
        .context("when reading content file")?;

    let tokens = parser.tokenize(&content);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in tokens {
            println!("{token}");
        }
    }
    Ok(())
}
