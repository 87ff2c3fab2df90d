use std::path::{Path, PathBuf};

use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;

use backdrop::config::load_or_default;
use backdrop::page::write_page;

/// Where and how the host page is produced
#[derive(Debug, Clone)]
pub struct PageSource {
    pub config: Option<PathBuf>,
    pub output: PathBuf,
    pub title: String,
    pub pkg_path: String,
}

impl PageSource {
    /// Regenerate the host page from the current config file
    fn regenerate(&self) -> anyhow::Result<()> {
        let config = load_or_default(self.config.as_deref())?;
        write_page(&config, &self.output, &self.title, &self.pkg_path)?;
        Ok(())
    }
}

/// Start the development server with hot reload
pub async fn serve(source: PageSource, port: u16) -> anyhow::Result<()> {
    // Generate initial page
    source.regenerate()?;
    println!("Generated host page in {}", source.output.display());

    // Create channel for config change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);

    // Watch the config file's directory, if there is a config file
    let mut config_watcher = None;
    if let Some(config_path) = &source.config {
        let tx_clone = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
            if let Ok(event) = res {
                if event.kind.is_modify() || event.kind.is_create() {
                    let _ = tx_clone.blocking_send(());
                }
            }
        })?;

        let watch_path = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
        config_watcher = Some(watcher);
    }

    // Spawn regeneration task
    let regen_source = source.clone();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}

            match regen_source.regenerate() {
                Ok(()) => tracing::info!("regenerated host page"),
                Err(e) => tracing::error!("error regenerating host page: {e:#}"),
            }
        }
    });

    // Create live reload layer
    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser whenever the output directory changes
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(&source.output, RecursiveMode::Recursive)?;

    // Build the router
    let app = Router::new()
        .fallback_service(ServeDir::new(&source.output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Development server running at http://localhost:{port}");
    if let Some(config_path) = &source.config {
        println!("Watching {} for changes...", config_path.display());
    }
    println!("Press Ctrl+C to stop");

    // Keep watchers alive
    let _config_watcher = config_watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}
