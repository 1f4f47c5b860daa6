//! pahviz player - headless driver for the diagram session
//!
//! Runs the frame loop that advances transitions and reads JSON-lines requests
//! from stdin, one response line per request on stdout.
//!
//! Storage locations (config.json, default SVG export):
//! - Linux: ~/.local/share/pahviz/
//! - Windows: %APPDATA%\pahviz\
//! - MacOS: ~/Library/Application Support/pahviz/

use std::sync::Arc;
use std::time::Duration;

use pahviz::{Session, SessionConfig, TaskDataset};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info, warn};

mod error;
mod paths;
mod state;

use error::PlayerError;
use paths::AppPaths;
use state::PlayerState;

fn load_config(paths: &AppPaths) -> SessionConfig {
    let file = paths.config_file();
    if !file.exists() {
        return SessionConfig::default();
    }
    match std::fs::read_to_string(&file)
        .map_err(pahviz::Error::from)
        .and_then(|body| SessionConfig::from_json_str(&body))
    {
        Ok(config) => {
            info!("Loaded config from {:?}", file);
            config
        }
        Err(e) => {
            warn!("Ignoring {:?}: {}", file, e);
            SessionConfig::default()
        }
    }
}

async fn read_requests(state: Arc<RwLock<PlayerState>>) -> Result<(), PlayerError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let (response, shutdown) = {
            let mut s = state.write().await;
            let response = s.handle_line(&line);
            (response, s.shutdown_requested)
        };

        stdout
            .write_all(serde_json::to_string(&response)?.as_bytes())
            .await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        if shutdown {
            info!("Shutdown requested");
            break;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let paths = AppPaths::new()?;
    info!("Data directory: {:?}", paths.data_dir());

    let session = Session::new(load_config(&paths), TaskDataset::builtin_cifar())
        .map_err(PlayerError::from)?;
    let state = Arc::new(RwLock::new(PlayerState::new(session, paths.svg_file())));

    // Frame loop
    let state_clone = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let frame_millis = state_clone.read().await.frame_millis();
            time::sleep(Duration::from_millis(frame_millis)).await;
            state_clone.write().await.tick();
        }
    });

    tokio::select! {
        res = read_requests(Arc::clone(&state)) => {
            if let Err(e) = res {
                error!("Request reader error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received");
        }
    }
    Ok(())
}
