use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pdfstream::parser::{ContentParser, ParseOptions, PdfNumber};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;

#[derive(Parser)]
#[command(name = "pdfstream")]
#[command(about = "Tokenize PDF content streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Log tokenizer diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a decoded content stream file
    Tokens {
        /// Content stream file (already decompressed)
        input: PathBuf,

        /// Fail on the first syntax error instead of recovering
        #[arg(long)]
        strict: bool,

        /// Refuse inputs larger than this many bytes
        #[arg(long)]
        max_bytes: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the canonical rendering of a number
    Number {
        /// Value to render
        #[arg(allow_negative_numbers = true)]
        value: String,

        /// Treat the value as a decimal literal instead of a single-precision float
        #[arg(long)]
        literal: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "pdfstream=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tokens {
            input,
            strict,
            max_bytes,
            format,
        } => {
            let mut options = if strict {
                ParseOptions::strict()
            } else {
                ParseOptions::default()
            };
            if let Some(limit) = max_bytes {
                options = options.with_max_input_bytes(limit);
            }

            let tokens = ContentParser::parse_file(&input, options)
                .with_context(|| format!("Failed to tokenize {}", input.display()))?;
            debug!(tokens = tokens.len(), file = %input.display(), "tokenized");

            let stdout = io::stdout();
            let mut out = stdout.lock();
            match format {
                OutputFormat::Text => render::write_text(&mut out, &tokens)?,
                OutputFormat::Json => render::write_json(&mut out, &tokens)?,
            }
            out.flush()?;
        }

        Commands::Number { value, literal } => {
            let number = if literal {
                PdfNumber::from_literal(&value)?
            } else {
                let float: f32 = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                PdfNumber::from_float(float)
            };
            println!("{number}");
        }
    }

    Ok(())
}
