mod config;
mod field;
mod game;
mod logging;
mod map;
mod render;
mod tank;
mod types;
mod world;

use clap::Parser;
use log::{LevelFilter, error, info};
use macroquad::prelude::Conf;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Obstacle block density as a fraction of interior cells.
    #[arg(long, default_value_t = config::OBSTACLE_DENSITY)]
    density: f32,

    /// Seed for the map layout RNG; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Debug filter to specify log topics (e.g., "move,fire,shell,map")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Gridtank".to_owned(),
        window_width: config::FIELD_WIDTH_PX as i32,
        window_height: config::FIELD_HEIGHT_PX as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(e) = logging::init_logger(log_level, args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Initializing Gridtank...");

    let world_config = world::WorldConfig {
        obstacle_density: args.density,
        seed: args.seed.unwrap_or_else(rand::random),
        ..Default::default()
    };
    let world = match world::World::new(world_config) {
        Ok(world) => world,
        Err(e) => {
            error!("Failed to create world: {}", e);
            std::process::exit(1);
        }
    };

    let renderer = render::Renderer::new(config::CELL_SIZE_PX);
    game::Game::new(world, renderer).run().await;
}
