use crate::cmd::ParseArgs;
use crate::config::load_parser;
use anyhow::{Context, Result};
use bb_parser::ParseTree;
use tokio::fs;
use tracing::trace;

pub async fn run_parse_command(args: ParseArgs) -> Result<()> {
    trace!("running parse command with args: {args:?}");

    let parser = load_parser(&args.vocabulary).await?;
    let content = fs::read_to_string(&args.file)
        .await
        .context("when reading content file")?;

    let tree = match parser.parse(&content) {
        Ok(tree) => tree,
        Err(e) => {
            // Tags are broken, keep the whole content as text.
            eprintln!("invalid document: {e}");
            ParseTree::Root {
                source: content.clone(),
                children: vec![ParseTree::Text(content)],
            }
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!("{tree:#?}");
    }
    Ok(())
}
