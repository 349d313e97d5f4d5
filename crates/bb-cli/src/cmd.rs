use crate::parse::run_parse_command;
use crate::tokens::run_tokens_command;
use crate::validate::run_validate_command;
use anyhow::Result;
use clap::ArgAction;
use clap::{Args, Parser, Subcommand};

///////// Groups /////////

#[derive(Clone, Debug, Args)]
pub struct VocabularyArgs {
    #[arg(
        short = 't',
        long = "tags",
        help = "Path to the toml file defining recognized tags. Use the standard tags if not set"
    )]
    pub tags: Option<String>,

    #[arg(
        long = "max-depth",
        help = "Maximum tag nesting depth, at most 1024. Override the value in tags file when presents"
    )]
    pub max_depth: Option<usize>,
}

///////// Args /////////

#[derive(Clone, Debug, Args)]
pub struct TokensArgs {
    #[command(flatten)]
    pub vocabulary: VocabularyArgs,

    #[arg(help = "File path to tokenize content")]
    pub file: String,

    #[arg(
        long = "json",
        help = "Print tokens in json format",
        default_value = "false",
        action = ArgAction::SetTrue,
    )]
    pub json: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub vocabulary: VocabularyArgs,

    #[arg(help = "File path to parse content")]
    pub file: String,

    #[arg(
        long = "json",
        help = "Print the tree in json format",
        default_value = "false",
        action = ArgAction::SetTrue,
    )]
    pub json: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub vocabulary: VocabularyArgs,

    #[arg(required = true, help = "File paths to validate")]
    pub files: Vec<String>,

    #[arg(
        short = 'j',
        long = "jobs",
        help = "Count of files validating at the same time",
        default_value = "4"
    )]
    pub jobs: usize,
}

///////// Subcommand /////////

#[derive(Clone, Debug, Parser)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    #[command(about = "print normalized tokens of bbcode file")]
    Tokens(TokensArgs),

    #[command(about = "parse bbcode file into tree")]
    Parse(ParseArgs),

    #[command(about = "check bbcode files have balanced tags")]
    Validate(ValidateArgs),
}

/// Main entry of all subcommands.
pub async fn run_command_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Tokens(tokens_args) => run_tokens_command(tokens_args).await,
        Command::Parse(parse_args) => run_parse_command(parse_args).await,
        Command::Validate(validate_args) => run_validate_command(validate_args).await,
    }
}
