//! Command-line interface for stratgen

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "stratgen",
    version,
    about = "AI-assisted QuantConnect strategy generation",
    long_about = "stratgen turns plain-language trading ideas into QuantConnect Lean \
                  algorithms. Each description is sent to the generation service (or \
                  rendered from a built-in skeleton when the service is unavailable), \
                  checked against structural rules, and saved with a JSON metadata file.",
    after_help = "EXAMPLES:
  # Generate the three sample strategies into ./generated
  stratgen run

  # Your own descriptions, in C#
  stratgen run \"Pairs trading on KO and PEP\" \"Turtle breakout\" --language csharp

  # One description per line from a file, without calling the service
  stratgen run --prompts-file ideas.txt --offline --output out/

  # Check an existing algorithm
  stratgen validate generated/strategy_1.py

  # Configuration
  stratgen config generate --output stratgen.yaml
  stratgen --config stratgen.yaml run

The API key is read from ANTHROPIC_API_KEY (a .env file in the working directory is loaded)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress the banner and progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long, global = true, value_name = "FILE", env = "STRATGEN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, validate and save a batch of strategies
    Run(RunArgs),

    /// Validate an existing strategy file
    Validate(ValidateArgs),

    /// Manage configuration files
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Strategy descriptions; the built-in samples are used when none are given
    #[arg(value_name = "PROMPT")]
    pub prompts: Vec<String>,

    /// Read descriptions from a file, one per line (blank lines and # comments skipped)
    #[arg(long, value_name = "FILE")]
    pub prompts_file: Option<PathBuf>,

    /// Strategy language
    #[arg(short, long, value_enum, value_name = "LANG")]
    pub language: Option<LanguageArg>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Never contact the generation service
    #[arg(long)]
    pub offline: bool,

    /// Skip the advisory linter
    #[arg(long)]
    pub no_lint: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Strategy source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Strategy language (inferred from the extension when omitted)
    #[arg(short, long, value_enum, value_name = "LANG")]
    pub language: Option<LanguageArg>,

    /// Skip the advisory linter
    #[arg(long)]
    pub no_lint: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Generate a default configuration file
    Generate {
        /// Output file path; the extension picks the format
        #[arg(short, long, default_value = "stratgen.yaml", value_name = "FILE")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate
        config: PathBuf,
    },

    /// Show the effective configuration
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    /// Python algorithms
    #[value(alias = "py")]
    Python,
    /// C# algorithms
    #[value(alias = "cs")]
    Csharp,
}

impl From<LanguageArg> for stratgen::types::Dialect {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Python => stratgen::types::Dialect::Python,
            LanguageArg::Csharp => stratgen::types::Dialect::CSharp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "stratgen", "-vv", "run", "idea one", "idea two", "-l", "cs", "--offline",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.prompts, vec!["idea one", "idea two"]);
                assert!(matches!(args.language, Some(LanguageArg::Csharp)));
                assert!(args.offline);
                assert!(!args.no_lint);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["stratgen", "validate", "a.py", "--json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.file, PathBuf::from("a.py"));
                assert!(args.json);
                assert!(args.language.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
