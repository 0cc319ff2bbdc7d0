//! Canvas Scene CLI
//!
//! Usage:
//!   canvas-scene [OPTIONS] [FILE]
//!
//! Options:
//!   -W, --width <PX>      Viewport width (default 1000)
//!   -H, --height <PX>     Viewport height (default 1000)
//!   -c, --config <FILE>   Scene configuration (TOML format)
//!   -n, --normalize       Print the normalized scene document instead of the tree
//!   -v, --verbose         Log layout decisions (repeat for more)
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use canvas_scene::{load_scene_with_config, SceneConfig};

#[derive(Parser)]
#[command(name = "canvas-scene")]
#[command(about = "Lay out a canvas scene document and print the resolved tree")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(short = 'W', long, default_value_t = 1000.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(short = 'H', long, default_value_t = 1000.0)]
    height: f64,

    /// Scene configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the normalized scene document as JSON
    #[arg(short, long)]
    normalize: bool,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match SceneConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // Recovered problems are logged by the loader
    let (scene, _report) = match load_scene_with_config(&source, cli.width, cli.height, config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.normalize {
        match scene.save_model().to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", scene.describe());
    }
}
