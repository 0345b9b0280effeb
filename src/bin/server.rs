//! ImgFS server binary
//!
//! Opens a container read-write and serves it over HTTP until SIGINT or
//! SIGTERM. In-flight workers are not joined on shutdown; the accept
//! loop stops, the engine drops and the container file closes.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use imgfs::http::{HttpServer, ImgFsService};
use imgfs::{Engine, ServerConfig};

/// ImgFS HTTP server
#[derive(Parser, Debug)]
#[command(name = "imgfs-server")]
#[command(about = "HTTP frontend for a single-file image store")]
#[command(version)]
struct Args {
    /// The container file to serve
    imgfs_file: PathBuf,

    /// TCP port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Directory the static index page is served from
    #[arg(long, default_value = ".")]
    web_root: PathBuf,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,imgfs=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("ImgFS server v{}", imgfs::VERSION);
    tracing::info!("container file: {}", args.imgfs_file.display());

    let engine = match Engine::open(&args.imgfs_file) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            tracing::error!("failed to open container: {err}");
            std::process::exit(1);
        }
    };

    println!("{}", engine.header());

    let config = ServerConfig::default()
        .listen_addr(format!("127.0.0.1:{}", args.port))
        .web_root(&args.web_root);
    let service = Arc::new(ImgFsService::new(
        Arc::clone(&engine),
        config.web_root.clone(),
    ));

    let mut server = HttpServer::new(config, service);
    if let Err(err) = server.bind() {
        tracing::error!("failed to start server: {err}");
        std::process::exit(1);
    }

    let shutdown = server.shutdown_handle();
    if let Err(err) = ctrlc::set_handler(move || {
        tracing::info!("termination signal received, shutting down...");
        shutdown.store(true, Ordering::Relaxed);
    }) {
        tracing::error!("failed to install signal handler: {err}");
        std::process::exit(1);
    }

    tracing::info!("ImgFS server started on http://localhost:{}", args.port);

    if let Err(err) = server.run() {
        tracing::error!("server error: {err}");
        std::process::exit(1);
    }

    tracing::info!("server stopped");
}
