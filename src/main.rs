use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use lovecard::rendering::BlockRasterizer;
use lovecard::share::{DiskSaver, NoSharePlatform};
use lovecard::{Card, CardConfig, Error, Pipeline, Viewport};

/// Render an agreement card for two names and save it as a PNG.
#[derive(Parser)]
#[command(name = "lovecard", version)]
struct Args {
    /// Requester name
    #[arg(long)]
    requester: String,

    /// Recipient name
    #[arg(long)]
    recipient: String,

    /// Card template file (HTML fragment); defaults to the stock card
    #[arg(long)]
    template: Option<PathBuf>,

    /// Base URL for resolving relative image sources in the template
    #[arg(long)]
    asset_base: Option<url::Url>,

    /// Directory the PNG is written into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Card width in CSS pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Card height in CSS pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Resolution multiplier
    #[arg(long, default_value_t = 2.0)]
    scale: f32,
}

#[tokio::main]
async fn main() -> lovecard::Result<()> {
    let args = Args::parse();

    let mut config = CardConfig::default();
    config.viewport = Viewport {
        width: args.width,
        height: args.height,
    };
    config.raster.scale = args.scale;

    let mut card = match &args.template {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .map_err(|e| Error::TemplateError(format!("cannot read {:?}: {}", path, e)))?;
            Card::from_html(html)
        }
        None => Card::default_template(),
    };

    let rasterizer = BlockRasterizer::new(config.viewport);
    let saver = Arc::new(DiskSaver::new(&args.out_dir));
    let mut pipeline = Pipeline::new(config, rasterizer, Arc::new(NoSharePlatform), saver)?;
    if let Some(base) = args.asset_base {
        pipeline = pipeline.with_asset_base(base);
    }
    pipeline.on_notice(|notice| eprintln!("{}", notice));

    let rendered = pipeline
        .generate(&mut card, &args.requester, &args.recipient)
        .await?;
    pipeline.download(&rendered, &args.requester, &args.recipient)?;

    let (req, rec) = pipeline.resolved_names(&args.requester, &args.recipient);
    println!(
        "Saved {} to {}",
        pipeline.delivery().download_file_name(&req, &rec),
        args.out_dir.display()
    );
    Ok(())
}
