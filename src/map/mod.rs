//! Tile grid: terrain, features, and the procedural generator that builds it

pub mod generation;
pub mod grid;
pub mod tile;

pub use generation::{generate_map, generate_seeded_map, MapGenerator, MapSpec};
pub use grid::GameMap;
pub use tile::{TerrainKind, Tile, TileFeature, MAX_CORRUPTION, MAX_STABILITY};
