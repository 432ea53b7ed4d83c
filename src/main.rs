use clap::{Parser, Subcommand};
use portrait_gal::imaging::RustBackend;
use portrait_gal::types::BuildStamp;
use portrait_gal::{config, generate, output, scan, version_string};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portrait-gal")]
#[command(about = "Single-page portrait gallery generator")]
#[command(long_about = "\
Single-page portrait gallery generator

Each configured folder becomes a section of one HTML page. Every image in it
needs a pre-made thumbnail next to it, named with the thumbnail marker
before the extension.

Source structure:

  site/
  ├── config.toml            # Optional overrides of the defaults
  ├── intro.md               # Optional intro; {total} = number of portraits
  ├── books/                 # Section \"Sketchbook portraits\" (anchors p1, p2, ...)
  │   ├── book1_1.png
  │   ├── book1_1t.png       # Thumbnail of book1_1.png
  │   ├── book1_2.png
  │   └── book1_2t.png
  └── misc/                  # Section \"Miscellaneous portraits\" (anchors m1, ...)
      ├── 1.png
      └── 1t.png

Files are ordered naturally (a_2 before a_10). The page and stylesheet are
written into the source directory (index.html, css/styles.css).

Run 'portrait-gal gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Source directory: section folders, config.toml, intro, and output
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Scan the sections and write the page and stylesheet (default)
    Build,
    /// Scan and report without writing anything
    Check,
    /// Print the gallery manifest as JSON
    Scan,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let source = cli.source;

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_config(&source)?;
            println!("==> Scanning {}", source.display());
            let manifest = scan::scan(&source, &config, &RustBackend::new())?;
            let site = generate::write_site(&source, &config, &manifest, &BuildStamp::now())?;
            output::print_build_output(&manifest, &site, &source);
        }
        Command::Check => {
            let config = config::load_config(&source)?;
            println!("==> Checking {}", source.display());
            let manifest = scan::scan(&source, &config, &RustBackend::new())?;
            let missing = generate::missing_includes(&source, &config);
            output::print_check_output(&manifest, &missing);
        }
        Command::Scan => {
            let config = config::load_config(&source)?;
            let manifest = scan::scan(&source, &config, &RustBackend::new())?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
