use clap::{Parser, Subcommand};
use pagefold::{config, discover, output, pipeline::Pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Documents to convert, shared by `render` and `check`.
#[derive(clap::Args, Clone)]
struct DocumentArgs {
    /// Markdown documents or directories (default: the whole content directory)
    documents: Vec<PathBuf>,

    /// Worker threads (defaults to the number of CPU cores)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,
}

#[derive(Parser)]
#[command(name = "pagefold")]
#[command(about = "Render markdown content into HTML fragments with responsive images")]
#[command(long_about = "\
Render markdown content into HTML fragments with responsive images

Each document becomes an HTML body fragment plus its front matter. Links to
sibling documents are rewritten to pretty URLs, and local images become
<picture> elements referencing width variants in the build directory.

Site layout:

  my-site/
  ├── pagefold.toml            # Site config (optional)
  ├── content/
  │   ├── index.md             # → /
  │   └── blog/
  │       ├── hello.md         # → /blog/hello/
  │       └── img/cover.jpg    # → /blog/img/cover.jpg, cover-640w.jpg, ...
  └── build/                   # Variants and thumbnails from the image step

Front matter is TOML between +++ lines or YAML between --- lines, merged on
top of [schema_data] from pagefold.toml.

Run 'pagefold gen-config' to generate a documented pagefold.toml.")]
#[command(version)]
struct Cli {
    /// Site root holding pagefold.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render documents and list the results
    Render {
        #[command(flatten)]
        args: DocumentArgs,

        /// Print rendered documents (HTML and front matter) as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate documents; fails on any error or warning
    Check(DocumentArgs),
    /// Print a stock pagefold.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render { args, json } => {
            let (documents, results) = convert(&cli.root, &args)?;
            if json {
                let rendered: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
                println!("{}", serde_json::to_string_pretty(&rendered)?);
                for (document, result) in documents.iter().zip(&results) {
                    if let Err(e) = result {
                        tracing::error!(document = %document.display(), error = %e, "Render failed");
                    }
                }
            } else {
                output::print_render_output(&documents, &results);
            }
            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                return Err(format!("{failed} document(s) failed").into());
            }
        }
        Command::Check(args) => {
            let (documents, results) = convert(&cli.root, &args)?;
            output::print_check_output(&documents, &results);
            let clean = results
                .iter()
                .all(|r| r.as_ref().is_ok_and(|doc| doc.warnings.is_empty()));
            if !clean {
                return Err("check found problems".into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

type Outcome = Result<pagefold::types::RenderedDocument, pagefold::pipeline::PipelineError>;

/// Load the site config and convert every requested document in parallel.
fn convert(
    root: &Path,
    args: &DocumentArgs,
) -> Result<(Vec<PathBuf>, Vec<Outcome>), Box<dyn std::error::Error>> {
    let root = std::path::absolute(root)?;
    let site_config = config::load_config(&root)?;
    init_thread_pool(args.jobs);

    let pipeline = Pipeline::from_config(&site_config, &root);
    let inputs = if args.documents.is_empty() {
        vec![pipeline.paths().content_dir().to_path_buf()]
    } else {
        args.documents
            .iter()
            .map(std::path::absolute)
            .collect::<Result<Vec<_>, _>>()?
    };
    let documents = discover::find_documents(&inputs)?;
    tracing::info!(
        documents = documents.len(),
        content = %pipeline.paths().content_dir().display(),
        "Rendering"
    );
    let results = pipeline.convert_all(&documents);
    Ok((documents, results))
}

/// Install the stderr log subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

/// Size the rayon pool. Caps at the number of available CPU cores.
fn init_thread_pool(jobs: Option<usize>) {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    let threads = jobs.map_or(cores, |j| j.clamp(1, cores));
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
