//! delve: procedural dungeon generator
//!
//! Generates seeded dungeons as JSON snapshots, renders them as ASCII maps
//! and dumps the reconstructed piece lists.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use delve_core::grid::Tile;
use delve_core::{load_dungeon, Dungeon, DungeonGenerator, DungeonProperties};

/// Procedural dungeon generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "delve - seeded dungeon generation", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dungeon from a seed
    Generate {
        /// Generation seed; the same seed always yields the same dungeon
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// JSON configuration file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the dungeon snapshot to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Render the tile grid as an ASCII map on stderr
        #[arg(short, long)]
        render: bool,
    },

    /// Render a saved dungeon snapshot as an ASCII map
    Show {
        /// Snapshot file written by `generate`
        file: PathBuf,
    },

    /// Dump the placeable piece list reconstructed from a snapshot
    Pieces {
        /// Snapshot file written by `generate`
        file: PathBuf,

        /// JSON configuration file, for the tile size
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<DungeonProperties, Box<dyn Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(DungeonProperties::default()),
    }
}

fn load_snapshot(path: &PathBuf) -> Result<Dungeon, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn tile_glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::MainRoom => 'M',
        Tile::Room => 'R',
        Tile::Hallway => '=',
        Tile::HallwayAndRoom => '+',
        Tile::RoomSpacing => ',',
        Tile::HallwaySpacing => '\'',
        Tile::Invalid => 'X',
    }
}

/// Top row printed last so y grows upward, matching grid coordinates
fn render_map(dungeon: &Dungeon) -> String {
    let size = dungeon.grid_size;
    let mut out = String::with_capacity(size * (size + 1));
    for y in (0..size).rev() {
        for x in 0..size {
            out.push(tile_glyph(dungeon.tiles[x + y * size]));
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            seed,
            config,
            out,
            render,
        } => {
            let config = load_config(config.as_ref())?;
            let dungeon = DungeonGenerator::new(seed, config)?.generate()?;
            info!(
                seed,
                rooms = dungeon.rooms.len(),
                grid_size = dungeon.grid_size,
                "dungeon generated"
            );

            let json = serde_json::to_string_pretty(&dungeon)?;
            match out {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }

            if render {
                eprint!("{}", render_map(&dungeon));
            }
        }

        Command::Show { file } => {
            let dungeon = load_snapshot(&file)?;
            print!("{}", render_map(&dungeon));
        }

        Command::Pieces { file, config } => {
            let dungeon = load_snapshot(&file)?;
            let config = load_config(config.as_ref())?;
            let pieces = load_dungeon(&dungeon, config.tile_size)?;
            println!("{}", serde_json::to_string_pretty(&pieces)?);
        }
    }

    Ok(())
}
