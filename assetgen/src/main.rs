use anyhow::anyhow;
use assetgen_rs::bundler::PUBLIC_URL;
use assetgen_rs::emit::{dist_file_name, DEFAULT_MODULE, DEFAULT_SOURCE_FILE};
use assetgen_rs::{AssetPipeline, BundleOptions, EmitOptions, ParcelBundler, PipelineConfig};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// assetgen: Bundle frontend entry points and embed their markup as Rust constants
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Entry points to bundle, in the order their constants are generated
    pub entries: Vec<String>,

    /// Project root containing src/, .entry-cache/ and dist/
    #[arg(long, env = "ASSETGEN_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Name of the generated module
    #[arg(short, long, env = "ASSETGEN_MODULE", default_value = DEFAULT_MODULE)]
    pub module: String,

    /// Source file that owns the assets. Output goes to <file>_dist.rs
    #[arg(short, long, env = "ASSETGEN_FILE", default_value = DEFAULT_SOURCE_FILE)]
    pub file: String,

    /// Output path, overriding the one derived from --file
    #[arg(short, long, env = "ASSETGEN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Command used to run Parcel, e.g. "npx parcel"
    #[arg(long, env = "ASSETGEN_PARCEL", default_value = "parcel")]
    pub parcel: String,

    /// URL prefix the server serves dist/ under
    #[arg(long, env = "ASSETGEN_PUBLIC_URL", default_value = PUBLIC_URL)]
    pub public_url: String,

    /// Format the generated file with rustfmt
    #[arg(long)]
    pub rustfmt: bool,

    /// Log more (-v for debug output)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let dest_file = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(dist_file_name(&self.file)));
        PipelineConfig {
            root: self.root.clone(),
            bundle: BundleOptions {
                public_url: self.public_url.clone(),
                ..Default::default()
            },
            emit: EmitOptions {
                module_name: self.module.clone(),
                dest_file,
                rustfmt: self.rustfmt,
            },
        }
    }
}

/// Default log filter for the -v/-q flags. RUST_LOG still takes precedence.
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let bundler = ParcelBundler::from_command_line(&args.parcel)
        .ok_or_else(|| anyhow!("bundler command must not be empty"))?;
    let pipeline = AssetPipeline::new(args.pipeline_config(), bundler);

    let report = pipeline.run(&args.entries).await.map_err(|err| {
        let stage = err.stage();
        anyhow::Error::new(err).context(format!("{stage} stage failed"))
    })?;

    log::info!(
        "Generated {} constant(s) in {} from {} bundled file(s)",
        report.identifiers.len(),
        report.dest_file.display(),
        report.bundle_count
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(err) = run(args).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
