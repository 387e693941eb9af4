use clap::Parser;
use mdnet::build::{build_site, BuildError};
use mdnet::config::{self, Settings};
use mdnet::prompt;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Converts a directory of Markdown posts into a static HTML site.
///
/// Settings given on the command line override the configuration file
/// (`config.yaml` in the working directory unless `--config` names another),
/// which overrides the built-in defaults.
#[derive(Parser)]
#[command(name = "mdnet", version, about)]
struct Cli {
    /// Directory containing the Markdown posts
    #[arg(value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Directory the site is written to
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Template for post pages
    #[arg(value_name = "POST_TEMPLATE")]
    post_template_path: Option<PathBuf>,

    /// Template for the main index page
    #[arg(value_name = "INDEX_TEMPLATE")]
    index_template_path: Option<PathBuf>,

    /// Generate a page per tag from this template
    #[arg(short, long = "tag-template", value_name = "TEMPLATE")]
    tag_template_path: Option<PathBuf>,

    /// Generate a page listing every tag from this template
    #[arg(short, long = "all-tags-template", value_name = "TEMPLATE")]
    all_tags_template_path: Option<PathBuf>,

    /// Generate a page listing every post from this template
    #[arg(short = 'p', long = "all-posts-template", value_name = "TEMPLATE")]
    all_posts_template_path: Option<PathBuf>,

    /// Number of latest posts on the main index page [default: 8]
    #[arg(short, long)]
    num_posts: Option<usize>,

    /// Number of threads used to parse posts (0 means one per CPU)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ask for the settings on the terminal
    #[arg(short, long)]
    interactive: bool,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            post_template_path: self.post_template_path.clone(),
            index_template_path: self.index_template_path.clone(),
            tag_template_path: self.tag_template_path.clone(),
            all_tags_template_path: self.all_tags_template_path.clone(),
            all_posts_template_path: self.all_posts_template_path.clone(),
            num_posts: self.num_posts,
            threads: self.threads,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Build(#[from] BuildError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose enables INFO and the default is WARN.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut settings = cli.settings();
    if cli.interactive {
        let stdin = std::io::stdin();
        let answers = prompt::ask(&mut stdin.lock(), &mut std::io::stdout())?;
        settings = answers.or(settings);
    }
    let file = Settings::load(cli.config.as_deref())?;
    let config = config::resolve(settings, file)?;

    let report = build_site(&config)?;
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if let Some(summary) = report.warning_summary() {
        warn!("{}", summary);
    }
    Ok(())
}
