//! nccfg CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error};

use nccfg::config::{DEFAULT_ENV_PREFIX, DEFAULT_OUTPUT_PATH};
use nccfg::objectstore::REQUIRED_VARIABLES;
use nccfg::{
    ConfigGenerator, DocsConfig, DotenvSource, DriftStatus, GeneratorConfig, LayeredEnv,
    NextcloudSchema, OutputFormat, ProcessEnv, WriteOutcome,
};

const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Parser, Debug)]
#[command(name = "nccfg", version, about = "Render Nextcloud custom.config.php from the environment")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the configuration file if its content changed
    Render(GenerateArgs),
    /// Print the rendered configuration to stdout
    Print(GenerateArgs),
    /// Exit 0 if the file is up to date, 1 if it is stale or missing
    Check(GenerateArgs),
    /// Print a markdown reference of all recognized settings
    Docs {
        /// Override prefix shown in the reference
        #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
        env_prefix: String,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// dotenv file layered under the process environment [default: .env if present]
    #[arg(long, env = "NCCFG_ENV_FILE", conflicts_with = "no_env_file")]
    env_file: Option<PathBuf>,

    /// Ignore dotenv files entirely
    #[arg(long)]
    no_env_file: bool,

    /// Output file
    #[arg(short, long, env = "NCCFG_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Output format [default: from the output extension]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Prefix of setting override variables
    #[arg(long, default_value = DEFAULT_ENV_PREFIX, conflicts_with = "no_env_overrides")]
    env_prefix: String,

    /// Render schema defaults, ignoring override variables
    #[arg(long)]
    no_env_overrides: bool,

    /// Keep an existing file's permissions instead of restricting it to its owner
    /// (a newly created file is owner-only either way)
    #[arg(long)]
    keep_permissions: bool,
}

impl GenerateArgs {
    fn into_generator(self) -> nccfg::Result<ConfigGenerator> {
        let mut env = LayeredEnv::new().layer(ProcessEnv);
        if let Some(path) = self.dotenv_path() {
            env = env.layer(DotenvSource::from_path(&path)?);
        }

        let format = self
            .format
            .unwrap_or_else(|| OutputFormat::from_path(&self.output));
        let mut builder = GeneratorConfig::builder()
            .output_path(self.output)
            .format(format)
            .secure_permissions(!self.keep_permissions)
            .env_source(env);
        builder = if self.no_env_overrides {
            builder.without_env_overrides()
        } else {
            builder.with_env_prefix(self.env_prefix)
        };

        Ok(ConfigGenerator::new(builder.build()))
    }

    fn dotenv_path(&self) -> Option<PathBuf> {
        if self.no_env_file {
            return None;
        }
        if let Some(ref path) = self.env_file {
            return Some(path.clone());
        }
        let default = Path::new(DEFAULT_ENV_FILE);
        if default.is_file() {
            Some(default.to_path_buf())
        } else {
            debug!("No {DEFAULT_ENV_FILE} in working directory, using process environment only");
            None
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> nccfg::Result<ExitCode> {
    match command {
        Commands::Render(args) => {
            let generator = args.into_generator()?;
            let outcome = generator.generate()?;
            let verb = match outcome {
                WriteOutcome::Created => "created",
                WriteOutcome::Updated => "updated",
                WriteOutcome::Unchanged => "unchanged",
            };
            println!("{}: {verb}", generator.output_path().display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Print(args) => {
            let generator = args.into_generator()?;
            print!("{}", generator.render()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let generator = args.into_generator()?;
            let status = generator.check()?;
            let path = generator.output_path().display();
            match status {
                DriftStatus::UpToDate => {
                    println!("{path}: up to date");
                    Ok(ExitCode::SUCCESS)
                }
                DriftStatus::Stale => {
                    println!("{path}: stale, run `nccfg render`");
                    Ok(ExitCode::from(1))
                }
                DriftStatus::Missing => {
                    println!("{path}: missing, run `nccfg render`");
                    Ok(ExitCode::from(1))
                }
            }
        }
        Commands::Docs { env_prefix } => {
            let docs = nccfg::generate_docs::<NextcloudSchema>(
                DocsConfig::new()
                    .with_title("Nextcloud Configuration Reference")
                    .with_env_prefix(Some(env_prefix)),
            );
            print!("{docs}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            if err.is_environment_error() {
                error!("Required variables: {}", REQUIRED_VARIABLES.join(", "));
            }
            ExitCode::from(2)
        }
    }
}
