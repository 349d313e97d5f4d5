use crate::cmd::ValidateArgs;
use crate::config::load_parser;
use crate::utils::parallel_future;
use anyhow::{bail, Context, Result};
use bb_parser::Parser;
use tokio::fs;
use tracing::trace;

/// Validate a single file, return the reason if invalid.
async fn validate_file(parser: Parser, file: String) -> Result<(String, Option<String>)> {
    let content = fs::read_to_string(&file)
        .await
        .with_context(|| format!("when reading content file {file}"))?;

    let reason = match parser.parse(&content) {
        Ok(tree) if tree.is_valid() => None,
        Ok(_) => Some("malformed tree".to_string()),
        Err(e) => Some(e.to_string()),
    };
    trace!("validated {file}: {reason:?}");
    Ok((file, reason))
}

pub async fn run_validate_command(args: ValidateArgs) -> Result<()> {
    trace!("running validate command with args: {args:?}");

    let parser = load_parser(&args.vocabulary).await?;
    let total = args.files.len();

    let mut results = parallel_future(args.files.into_iter(), args.jobs.max(1), |file| {
        validate_file(parser.clone(), file)
    })
    .await?;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut invalid = 0;
    for (file, reason) in results {
        match reason {
            Some(reason) => {
                invalid += 1;
                println!("{file}: invalid: {reason}");
            }
            None => println!("{file}: valid"),
        }
    }

    if invalid > 0 {
        bail!("{invalid} of {total} files are invalid");
    }
    Ok(())
}
