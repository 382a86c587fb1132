use anyhow::{Context, Result};
use clap::Parser;
use nexgallery_dlna::{GalleryClient, GalleryConfig, ImageItem};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// List the images published by a UPnP/DLNA media server
#[derive(Debug, Parser)]
#[command(name = "nexgallery", version)]
struct Args {
    /// Config file (defaults to <config dir>/nexgallery/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Media server base URL, e.g. http://10.0.0.1:64321
    #[arg(short, long)]
    base_url: Option<String>,

    /// Browse every page of large containers instead of only the first
    #[arg(long)]
    paginate: bool,

    /// Fill titles from dc:title
    #[arg(long)]
    titles: bool,

    /// Also report date, resolution and size of each image
    #[arg(long)]
    metadata: bool,

    /// Do not browse containers deeper than this
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the image list as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nexgallery=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let client = GalleryClient::new(config).context("Failed to create gallery client")?;
    tracing::info!("Media server: {}", client.config().base_url);

    let description = client
        .describe()
        .await
        .context("Failed to read device description")?;
    if !args.json {
        println!(
            "Device: {} ({} {})",
            description.friendly_name.as_deref().unwrap_or("unknown"),
            description.manufacturer.as_deref().unwrap_or("-"),
            description.model_name.as_deref().unwrap_or("-"),
        );
        println!("ContentDirectory control URL: {}", description.control_url);
        println!();
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping traversal");
                cancel.cancel();
            }
        }
    });

    let images = client
        .fetch_images_with_cancel(cancel)
        .await
        .context("Failed to list images; check the Wi-Fi connection to the media server")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&images)?);
    } else {
        print_images(&images);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<GalleryConfig> {
    let path = args.config.clone().or_else(GalleryConfig::default_path);
    let mut config = match &path {
        Some(path) => GalleryConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GalleryConfig::default(),
    };

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.paginate {
        config.paginate = true;
    }
    if args.titles {
        config.capture_titles = true;
    }
    if args.metadata {
        config.capture_metadata = true;
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }

    Ok(config)
}

fn print_images(images: &[ImageItem]) {
    for image in images {
        if image.title.is_empty() {
            println!("{}  {}", image.id, image.url);
        } else {
            println!("{}  {}  {}", image.id, image.title, image.url);
        }
        if let Some(date) = &image.date {
            println!("    date: {}", date);
        }
        if let Some(resolution) = &image.resolution {
            println!("    resolution: {}", resolution);
        }
        if let Some(size) = image.size {
            println!("    size: {} bytes", size);
        }
    }
    println!();
    println!("{} image(s)", images.len());
}
