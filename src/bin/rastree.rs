use std::{
    fs::File,
    io::{BufReader, Read as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rastree", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a component tree and render it to an image.
    Render(RenderArgs),
    /// Encode or decode share state.
    Share {
        #[command(subcommand)]
        op: ShareOp,
    },
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input component tree JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Orchestrator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Output format; defaults to the output path's extension.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Backend to use.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Outline every box (red border box, green content box).
    #[arg(long)]
    debug_border: bool,
}

#[derive(Subcommand, Debug)]
enum ShareOp {
    /// Compress stdin (or `--in`) into a share string.
    Encode {
        /// Input file; stdin when omitted.
        #[arg(long = "in")]
        in_path: Option<PathBuf>,
    },
    /// Expand a share string back into the original state.
    Decode {
        /// Encoded share string.
        value: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Webp,
    Jpeg,
    Raw,
}

impl From<FormatChoice> for rastree::OutputFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Png => Self::Png,
            FormatChoice::Webp => Self::WebP,
            FormatChoice::Jpeg => Self::Jpeg,
            FormatChoice::Raw => Self::Raw,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Native,
    NativeAsync,
    WasmSync,
    WasmAsync,
    Worker,
}

impl From<BackendChoice> for rastree::BackendKind {
    fn from(value: BackendChoice) -> Self {
        match value {
            BackendChoice::Native => Self::Native,
            BackendChoice::NativeAsync => Self::NativeAsync,
            BackendChoice::WasmSync => Self::WasmSync,
            BackendChoice::WasmAsync => Self::WasmAsync,
            BackendChoice::Worker => Self::Worker,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Share { op } => cmd_share(op),
    }
}

fn read_tree_json(path: &Path) -> anyhow::Result<rastree::Element> {
    let f = File::open(path).with_context(|| format!("open component tree '{}'", path.display()))?;
    let r = BufReader::new(f);
    let tree: rastree::Element =
        serde_json::from_reader(r).with_context(|| "parse component tree JSON")?;
    Ok(tree)
}

fn format_from_extension(path: &Path) -> Option<rastree::OutputFormat> {
    path.extension()?.to_str()?.parse().ok()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let tree = read_tree_json(&args.in_path)?;

    let mut config = match &args.config {
        Some(path) => rastree::OrchestratorConfig::from_path(path)?,
        None => rastree::OrchestratorConfig::default(),
    };
    if args.config.is_none() {
        let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
        config.asset_root = Some(root.to_path_buf());
    }
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }

    let mut options = config.options;
    if let Some(width) = args.width {
        options.viewport.width = width;
    }
    if let Some(height) = args.height {
        options.viewport.height = height;
    }
    if let Some(format) = args.format {
        options.format = format.into();
    } else if let Some(format) = format_from_extension(&args.out) {
        options.format = format;
    }
    if args.quality.is_some() {
        options.quality = args.quality;
    }
    if args.debug_border {
        options.debug_border = true;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let bytes = runtime.block_on(async {
        let orchestrator = rastree::Orchestrator::from_config(&config)?;
        orchestrator.render(&tree, options).await
    })?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write {} '{}'", options.format.as_str(), args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_share(op: ShareOp) -> anyhow::Result<()> {
    match op {
        ShareOp::Encode { in_path } => {
            let state = match in_path {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("read share state '{}'", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("read share state from stdin")?;
                    buf
                }
            };
            println!("{}", rastree::encode_share_state(&state)?);
        }
        ShareOp::Decode { value } => {
            print!("{}", rastree::decode_share_state(&value)?);
        }
    }
    Ok(())
}
