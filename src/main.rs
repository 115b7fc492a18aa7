use clap::{Parser, Subcommand};
use log::LevelFilter;
use quire::imaging::RustBackend;
use quire::pipeline::{self, BuildError, BuildOptions};
use quire::{config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Static blog generator with post series and image thumbnailing")]
#[command(long_about = "\
Static blog generator with post series and image thumbnailing

Every Markdown file in the content directory becomes one page of the site.
Numbered files are dated posts, everything else is a standalone page.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── 001-hello.md                 # Post 1 → p1.html
  ├── 002-rendering.md             # Post 2, may declare -parent=1
  ├── about.md                     # Page → pabout.html
  ├── 1/                           # Images of post 1 (and its series)
  │   └── chart.png
  └── static/                      # Copied to dist/static/ unchanged
      └── style.css

Front matter (leading lines of the form -key=value):
  -title=...     Title (defaults to the first level-1 heading)
  -time=...      Publish time, required for posts
  -updated=...   Last update time
  -type=...      post or page
  -parent=ID     Make this post part of a series
  -id=ID         Override the identifier derived from the file name

Link to other documents with [text](*ID) or [%](*ID) to use their title.

Run 'quire gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (generated thumbnails)
    #[arg(long, default_value = ".quire-cache", global = true)]
    cache_dir: PathBuf,

    /// Log every step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → render → generate
    Build {
        /// Write the site even if some documents failed to render
        #[arg(long)]
        keep_going: bool,
    },
    /// Validate content and report every render error without writing the site
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let backend = RustBackend::new();

    match cli.command {
        Command::Build { keep_going } => {
            let options = BuildOptions {
                source: cli.source,
                output: cli.output,
                cache_dir: cli.cache_dir,
                keep_going,
            };

            println!("==> Building {}", options.source.display());
            match pipeline::build(&options, &backend) {
                Ok((site, report)) => {
                    output::print_content_output(&site.graph, &site.assets, &site.source);
                    output::print_render_failures(&site.failures);
                    println!();
                    output::print_generate_output(&report, &site.graph);
                    println!("==> Build complete: {}", options.output.display());
                }
                Err(BuildError::RenderFailed { failures }) => {
                    output::print_render_failures(&failures);
                    return Err(BuildError::RenderFailed { failures }.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = pipeline::prepare(&cli.source, &cli.cache_dir, &backend)?;
            output::print_content_output(&site.graph, &site.assets, &site.source);
            if !site.failures.is_empty() {
                output::print_render_failures(&site.failures);
                return Err(BuildError::RenderFailed {
                    failures: site.failures,
                }
                .into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
