use std::path::PathBuf;

use clap::{Parser, Subcommand};

use backdrop::config::load_or_default;
use backdrop::page::{DEFAULT_TITLE, write_page};
use backdrop::snapshot::{self, SnapshotOptions};

mod server;

/// Decorative canvas backdrop: headless snapshots, host page and dev server.
#[derive(Parser)]
#[command(name = "backdrop")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.yaml, .yml or .json); defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render both effects headless and write the last frame as SVG
    Snapshot {
        /// Viewport width in pixels
        #[arg(long, default_value = "1500")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "900")]
        height: u32,

        /// Number of frames to simulate
        #[arg(short = 'n', long, default_value = "120")]
        frames: u64,

        /// Random seed (overrides the config file; random when neither is set)
        #[arg(long)]
        seed: Option<u64>,

        /// Pointer position as X,Y held for the whole run
        #[arg(long, value_parser = parse_pointer)]
        pointer: Option<(f32, f32)>,

        /// Output directory for SVG files and stats.json
        #[arg(short, long, default_value = "snapshot")]
        output: PathBuf,
    },
    /// Generate the host HTML page
    Page {
        /// Output directory for index.html
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Page title
        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,

        /// URL of the directory holding the wasm package
        #[arg(long, default_value = "./pkg")]
        pkg_path: String,
    },
    /// Start development server with hot reload
    Serve {
        /// Output directory for the generated page
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Page title
        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,

        /// URL of the directory holding the wasm package
        #[arg(long, default_value = "./pkg")]
        pkg_path: String,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn parse_pointer(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad X: {e}"))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad Y: {e}"))?;
    Ok((x, y))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("backdrop=info".parse()?)
                .add_directive("backdrop_fx=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot {
            width,
            height,
            frames,
            seed,
            pointer,
            output,
        } => {
            let config = load_or_default(cli.config.as_deref())?;
            let options = SnapshotOptions {
                width,
                height,
                frames,
                seed: seed.or(config.seed).unwrap_or_else(rand::random),
                pointer,
            };
            let rendered = snapshot::render(&config, &options);
            let written = snapshot::write(&rendered, &output)?;
            println!(
                "Rendered {} frames at {}x{} (seed {}) into {}",
                rendered.report.frames,
                width,
                height,
                options.seed,
                output.display()
            );
            for path in written {
                println!("  {}", path.display());
            }
        }
        Commands::Page {
            output,
            title,
            pkg_path,
        } => {
            let config = load_or_default(cli.config.as_deref())?;
            let path = write_page(&config, &output, &title, &pkg_path)?;
            println!("Generated host page {}", path.display());
        }
        Commands::Serve {
            output,
            title,
            pkg_path,
            port,
        } => {
            let source = server::PageSource {
                config: cli.config,
                output,
                title,
                pkg_path,
            };
            server::serve(source, port).await?;
        }
    }

    Ok(())
}
