use clap::{Parser, Subcommand};
use richmark::config::{Config, config_file_path, load_config};
use richmark::richtext::markdown_parser::parse_markdown;
use richmark::richtext::{
    MatchMode, Run, StylerConfig, markdown_to_buffer, on_line_break, to_markdown,
};
use richmark::sample::SAMPLE_MARKDOWN;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "richmark")]
#[command(about = "Style markdown as rich text and export it back", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Body text size used for styling and export
    #[arg(long, global = true)]
    base_size: Option<u32>,

    /// Locate constructs by first occurrence in the whole text
    #[arg(long, global = true)]
    legacy_matching: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Style markdown and print the resulting runs as TOML
    Style {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Style markdown, then export it back to markdown
    Export {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Show what a line break at OFFSET would insert
    Continue {
        /// Char offset of the line break
        #[arg(short, long)]
        offset: usize,
        /// Text file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Print the parsed document tree
    Parse {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Style the built-in sample document
    Sample,
}

#[derive(Serialize)]
struct StyledOutput<'a> {
    text: String,
    runs: &'a [Run],
}

#[derive(Serialize)]
struct ContinuationOutput {
    inserted_text: String,
    new_cursor_offset: usize,
}

fn read_input(file: Option<&PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(input)
        }
    }
}

fn styler_config(args: &Args) -> Result<StylerConfig, String> {
    let config = match args.config.clone().or_else(config_file_path) {
        Some(path) => load_config(&path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let mut styler = config.styler();
    if let Some(base_size) = args.base_size {
        if base_size == 0 {
            return Err("--base-size must be greater than zero".to_string());
        }
        styler.base_size = base_size;
    }
    if args.legacy_matching {
        styler.match_mode = MatchMode::FirstOccurrence;
    }
    Ok(styler)
}

fn cmd_style(file: Option<&PathBuf>, config: &StylerConfig) -> Result<(), String> {
    let buffer = markdown_to_buffer(&read_input(file)?, config);
    let output = StyledOutput {
        text: buffer.text(),
        runs: buffer.runs(),
    };
    let toml = toml::to_string_pretty(&output)
        .map_err(|e| format!("toml serialization error: {}", e))?;
    print!("{}", toml);
    Ok(())
}

fn cmd_export(file: Option<&PathBuf>, config: &StylerConfig) -> Result<(), String> {
    let buffer = markdown_to_buffer(&read_input(file)?, config);
    println!("{}", to_markdown(&buffer, config.base_size));
    Ok(())
}

fn cmd_continue(offset: usize, file: Option<&PathBuf>) -> Result<(), String> {
    let continuation = on_line_break(&read_input(file)?, offset);
    let output = ContinuationOutput {
        inserted_text: continuation.inserted_text,
        new_cursor_offset: continuation.new_cursor_offset,
    };
    let toml = toml::to_string_pretty(&output)
        .map_err(|e| format!("toml serialization error: {}", e))?;
    print!("{}", toml);
    Ok(())
}

fn cmd_parse(file: Option<&PathBuf>) -> Result<(), String> {
    print!("{}", parse_markdown(&read_input(file)?));
    Ok(())
}

fn cmd_sample(config: &StylerConfig) -> Result<(), String> {
    let buffer = markdown_to_buffer(SAMPLE_MARKDOWN, config);
    println!("{}", buffer.text());
    println!();
    println!("{}", to_markdown(&buffer, config.base_size));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = styler_config(&args).and_then(|config| match &args.command {
        Commands::Style { file } => cmd_style(file.as_ref(), &config),
        Commands::Export { file } => cmd_export(file.as_ref(), &config),
        Commands::Continue { offset, file } => cmd_continue(*offset, file.as_ref()),
        Commands::Parse { file } => cmd_parse(file.as_ref()),
        Commands::Sample => cmd_sample(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
