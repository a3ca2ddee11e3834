//! Procedural map generation
//!
//! Deterministic for a given seed: every random choice comes from one
//! ChaCha8 stream seeded from the map seed, and the three coherent-noise
//! fields are seeded from that same stream. Gameplay randomness never
//! touches this stream.

use ahash::AHashSet;
use noise::{NoiseFn, Simplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::grid::GameMap;
use super::tile::{TerrainKind, Tile, TileFeature, MAX_CORRUPTION};
use crate::core::config::Richness;
use crate::core::types::{Owner, TileKey};

/// Spatial frequency of the base octave
const BASE_FREQUENCY: f64 = 0.09;

/// Octave weights for height and moisture
const OCTAVE_WEIGHTS: [f64; 3] = [1.0, 0.5, 0.25];

/// Tiles per feature at normal richness
const VILLAGE_AREA: f64 = 70.0;
const SACRED_WELL_AREA: f64 = 140.0;
const RUINS_AREA: f64 = 160.0;
const SHADOW_SEED_AREA: f64 = 90.0;

/// Rejection-sampling attempts per requested placement
const ATTEMPTS_PER_PLACEMENT: usize = 40;

/// Shadow seeds stay outside this fraction of the smaller map dimension from center
const SHADOW_CENTER_RADIUS_FRACTION: f64 = 0.25;

/// Inputs to map generation
#[derive(Debug, Clone)]
pub struct MapSpec {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    pub richness: Richness,
    /// Stability given to shadow seed tiles
    pub shadow_stability: u8,
}

impl MapSpec {
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            richness: Richness::Normal,
            shadow_stability: 3,
        }
    }

    fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }
}

/// Stateful generator holding the seeded stream between passes
pub struct MapGenerator {
    spec: MapSpec,
    rng: ChaCha8Rng,
}

impl MapGenerator {
    pub fn new(spec: MapSpec) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(spec.seed);
        Self { spec, rng }
    }

    /// Terrain and feature passes
    pub fn generate(&mut self) -> GameMap {
        let height_field = Simplex::new(self.rng.gen::<u32>());
        let moisture_field = Simplex::new(self.rng.gen::<u32>());
        let feature_field = Simplex::new(self.rng.gen::<u32>());

        let mut map = GameMap::new(self.spec.width, self.spec.height);
        for y in 0..self.spec.height {
            for x in 0..self.spec.width {
                let h = sample_octaves(&height_field, x, y);
                let m = sample_octaves(&moisture_field, x, y);
                let key = TileKey::new(x, y);
                map.tiles.insert(key, Tile::new(key, classify_terrain(h, m)));
            }
        }

        let richness = self.spec.richness.feature_multiplier();
        let area = self.spec.area();
        let plan = [
            (TileFeature::Village, VILLAGE_AREA, 4, -0.3),
            (TileFeature::SacredWell, SACRED_WELL_AREA, 5, 0.0),
            (TileFeature::AncientRuins, RUINS_AREA, 6, 0.1),
        ];
        for (feature, per_area, min_distance, acceptance) in plan {
            let wanted = ((area / per_area) * richness).round().max(1.0) as usize;
            let placed = self.place_feature(&mut map, &feature_field, feature, wanted, min_distance, acceptance);
            if placed < wanted {
                tracing::debug!(?feature, wanted, placed, "feature placement fell short");
            }
        }

        map
    }

    fn place_feature(
        &mut self,
        map: &mut GameMap,
        field: &Simplex,
        feature: TileFeature,
        wanted: usize,
        min_distance: u32,
        acceptance: f64,
    ) -> usize {
        let mut placed: Vec<TileKey> = Vec::new();
        let mut attempts = wanted * ATTEMPTS_PER_PLACEMENT;

        while placed.len() < wanted && attempts > 0 {
            attempts -= 1;
            let key = TileKey::new(
                self.rng.gen_range(0..self.spec.width),
                self.rng.gen_range(0..self.spec.height),
            );
            let value = field.get([key.x as f64 * BASE_FREQUENCY * 2.0, key.y as f64 * BASE_FREQUENCY * 2.0]);
            if value < acceptance {
                continue;
            }
            if placed.iter().any(|p| p.manhattan(&key) < min_distance) {
                continue;
            }
            let Some(tile) = map.get_mut(&key) else {
                continue;
            };
            if tile.impassable || tile.feature.is_some() {
                continue;
            }
            tile.set_feature(feature);
            placed.push(key);
        }

        placed.len()
    }

    /// Scatter Shadow seeds away from the center and outside `excluded`
    ///
    /// Returns the number of seeds placed; a shortfall is not an error.
    pub fn seed_shadow(&mut self, map: &mut GameMap, excluded: &AHashSet<TileKey>) -> usize {
        let wanted = (self.spec.area() / SHADOW_SEED_AREA).round().max(1.0) as usize;
        let radius = (self.spec.width.min(self.spec.height) as f64 * SHADOW_CENTER_RADIUS_FRACTION) as u32;
        let center = map.center();
        let mut placed = 0;
        let mut attempts = wanted * ATTEMPTS_PER_PLACEMENT;

        while placed < wanted && attempts > 0 {
            attempts -= 1;
            let key = TileKey::new(
                self.rng.gen_range(0..self.spec.width),
                self.rng.gen_range(0..self.spec.height),
            );
            if key.manhattan(&center) <= radius || excluded.contains(&key) {
                continue;
            }
            let Some(tile) = map.get_mut(&key) else {
                continue;
            };
            if tile.impassable || tile.feature.is_some() || tile.owner.is_shadow() {
                continue;
            }
            tile.owner = Owner::Shadow;
            tile.corruption = MAX_CORRUPTION;
            tile.stability = self.spec.shadow_stability;
            placed += 1;
        }

        tracing::debug!(wanted, placed, radius, "shadow seeds placed");
        placed
    }
}

/// Generate terrain and features for `spec` (no shadow seeds)
pub fn generate_map(spec: &MapSpec) -> GameMap {
    MapGenerator::new(spec.clone()).generate()
}

/// Generate a map and immediately seed it with Shadow, excluding `excluded`
pub fn generate_seeded_map(spec: &MapSpec, excluded: &AHashSet<TileKey>) -> GameMap {
    let mut generator = MapGenerator::new(spec.clone());
    let mut map = generator.generate();
    generator.seed_shadow(&mut map, excluded);
    map
}

/// Three-octave sample normalized to [0, 1]
fn sample_octaves(field: &Simplex, x: i32, y: i32) -> f64 {
    let total_weight: f64 = OCTAVE_WEIGHTS.iter().sum();
    let mut value = 0.0;
    let mut frequency = BASE_FREQUENCY;
    for weight in OCTAVE_WEIGHTS {
        value += weight * field.get([x as f64 * frequency, y as f64 * frequency]);
        frequency *= 2.0;
    }
    ((value / total_weight + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Height/moisture thresholds to terrain
pub fn classify_terrain(height: f64, moisture: f64) -> TerrainKind {
    if height > 0.78 {
        TerrainKind::Mountain
    } else if height < 0.25 {
        TerrainKind::Water
    } else if height < 0.32 {
        TerrainKind::Coast
    } else if moisture > 0.65 && height < 0.45 {
        TerrainKind::Swamp
    } else if moisture > 0.75 && height < 0.65 {
        TerrainKind::Grove
    } else if moisture > 0.55 {
        TerrainKind::Forest
    } else if height > 0.65 {
        TerrainKind::Hills
    } else if moisture < 0.3 {
        TerrainKind::Desert
    } else {
        TerrainKind::Plains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_terrain_thresholds() {
        assert_eq!(classify_terrain(0.9, 0.5), TerrainKind::Mountain);
        assert_eq!(classify_terrain(0.1, 0.5), TerrainKind::Water);
        assert_eq!(classify_terrain(0.3, 0.5), TerrainKind::Coast);
        assert_eq!(classify_terrain(0.4, 0.7), TerrainKind::Swamp);
        assert_eq!(classify_terrain(0.5, 0.8), TerrainKind::Grove);
        assert_eq!(classify_terrain(0.5, 0.6), TerrainKind::Forest);
        assert_eq!(classify_terrain(0.7, 0.4), TerrainKind::Hills);
        assert_eq!(classify_terrain(0.5, 0.2), TerrainKind::Desert);
        assert_eq!(classify_terrain(0.5, 0.4), TerrainKind::Plains);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let spec = MapSpec::new(24, 18, 1234);
        let a = generate_map(&spec);
        let b = generate_map(&spec);
        for key in a.keys_in_order() {
            assert_eq!(a.get(&key), b.get(&key), "tile {} differs", key);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_map(&MapSpec::new(24, 18, 1));
        let b = generate_map(&MapSpec::new(24, 18, 2));
        let differing = a
            .keys_in_order()
            .filter(|k| a.get(k).map(|t| t.terrain) != b.get(k).map(|t| t.terrain))
            .count();
        assert!(differing > 0);
    }

    #[test]
    fn test_features_respect_spacing() {
        let map = generate_map(&MapSpec::new(40, 30, 77));
        for (feature, min_distance) in [
            (TileFeature::Village, 4),
            (TileFeature::SacredWell, 5),
            (TileFeature::AncientRuins, 6),
        ] {
            let keys: Vec<_> = map
                .keys_in_order()
                .filter(|k| map.get(k).and_then(|t| t.feature) == Some(feature))
                .collect();
            for (i, a) in keys.iter().enumerate() {
                for b in &keys[i + 1..] {
                    assert!(a.manhattan(b) >= min_distance, "{:?} too close: {} {}", feature, a, b);
                }
                assert!(!map.get(a).unwrap().impassable);
            }
        }
    }

    #[test]
    fn test_shadow_seeds_avoid_center_and_exclusions() {
        let spec = MapSpec::new(30, 30, 9);
        let excluded: AHashSet<TileKey> = (0..5)
            .flat_map(|x| (0..5).map(move |y| TileKey::new(x, y)))
            .collect();
        let map = generate_seeded_map(&spec, &excluded);
        let center = map.center();
        let seeds: Vec<_> = map
            .keys_in_order()
            .filter(|k| map.get(k).unwrap().owner.is_shadow())
            .collect();
        assert!(!seeds.is_empty());
        for key in seeds {
            let tile = map.get(&key).unwrap();
            assert!(key.manhattan(&center) > 7);
            assert!(!excluded.contains(&key));
            assert!(!tile.impassable);
            assert!(tile.feature.is_none());
            assert_eq!(tile.corruption, MAX_CORRUPTION);
        }
    }
}
