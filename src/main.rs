//! MazeNav - maze navigation node
//!
//! Loads the wall geometry, builds the occupancy and wall grids, and drives
//! one frontier exploration session, logging progress and the terminal
//! state.

use std::path::Path;

use tracing::{info, warn};

use maze_nav::config::NavConfig;
use maze_nav::core::Pose2D;
use maze_nav::error::Result;
use maze_nav::exploration::{run_session, SessionOutcome};
use maze_nav::service::NavService;
use maze_nav::stream::FramePublisher;
use maze_nav::walls;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("maze_nav=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = if args.len() > 1 {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        NavConfig::load(config_path)?
    } else if Path::new("maze_nav.toml").exists() {
        info!("Loading configuration from maze_nav.toml");
        NavConfig::load(Path::new("maze_nav.toml"))?
    } else {
        info!("Using default configuration");
        NavConfig::default()
    };

    info!("MazeNav v{}", env!("CARGO_PKG_VERSION"));

    // Build the grids; this blocks until wall geometry is available
    let segments = walls::load_wall_file(Path::new(&config.map.wall_file))?;
    let points = walls::discretize(&segments, config.map.discretization_step);
    info!(
        "Discretized {} wall segments into {} points",
        segments.len(),
        points.len()
    );

    let (publisher, frames) = FramePublisher::channel(64);
    let start = Pose2D::new(
        config.map.start_x,
        config.map.start_y,
        config.map.start_theta,
    );
    let max_cycles = config.map.max_cycles;

    let mut service = NavService::new(config, &points, Some(publisher))?;
    info!(
        "Grids ready: {}x{} cells at {}m",
        service.store().width(),
        service.store().height(),
        service.store().square_size()
    );

    let outcome = run_session(&mut service, start, max_cycles);
    match outcome {
        SessionOutcome::Complete => info!("Exploration session complete"),
        SessionOutcome::CycleLimit => warn!("Exploration session hit the cycle budget"),
    }

    info!(
        "{} frontiers retained, {} observability frames pending",
        service.engine().frontiers().len(),
        frames.len()
    );

    Ok(())
}
