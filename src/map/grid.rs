//! The fixed-size tile grid

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::tile::{TerrainKind, Tile};
use crate::core::types::TileKey;

/// All tiles of a match, keyed by coordinate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub tiles: AHashMap<TileKey, Tile>,
}

impl GameMap {
    /// Create a map filled with plains
    pub fn new(width: i32, height: i32) -> Self {
        let mut tiles = AHashMap::with_capacity((width * height).max(0) as usize);
        for y in 0..height {
            for x in 0..width {
                let key = TileKey::new(x, y);
                tiles.insert(key, Tile::new(key, TerrainKind::Plains));
            }
        }
        Self { width, height, tiles }
    }

    pub fn get(&self, key: &TileKey) -> Option<&Tile> {
        self.tiles.get(key)
    }

    pub fn get_mut(&mut self, key: &TileKey) -> Option<&mut Tile> {
        self.tiles.get_mut(key)
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Keys in row-major order; use wherever iteration order must be stable
    pub fn keys_in_order(&self) -> impl Iterator<Item = TileKey> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| TileKey::new(x, y)))
            .filter(|k| self.tiles.contains_key(k))
    }

    /// Orthogonal neighbors that exist on the map
    pub fn neighbors(&self, key: &TileKey) -> impl Iterator<Item = TileKey> + '_ {
        key.neighbors().into_iter().filter(|n| self.contains(n))
    }

    /// Existing keys within Manhattan distance `radius` of `center`
    pub fn within(&self, center: TileKey, radius: u32) -> Vec<TileKey> {
        let r = radius as i32;
        let mut keys = Vec::new();
        for y in (center.y - r)..=(center.y + r) {
            for x in (center.x - r)..=(center.x + r) {
                let key = TileKey::new(x, y);
                if center.manhattan(&key) <= radius && self.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    pub fn center(&self) -> TileKey {
        TileKey::new(self.width / 2, self.height / 2)
    }

    pub fn passable_count(&self) -> usize {
        self.tiles.values().filter(|t| !t.impassable).count()
    }

    /// Movement cost to every tile reachable from `start` within `budget`
    ///
    /// Dijkstra over tile movement costs. Impassable tiles and any tile for
    /// which `blocked` returns true are never entered. The start tile maps to 0.
    pub fn reachable<F>(&self, start: TileKey, budget: u32, blocked: F) -> AHashMap<TileKey, u32>
    where
        F: Fn(&TileKey) -> bool,
    {
        let mut best: AHashMap<TileKey, u32> = AHashMap::new();
        let mut open = BinaryHeap::new();
        best.insert(start, 0);
        open.push(Reverse((0u32, start)));

        while let Some(Reverse((cost, key))) = open.pop() {
            if best.get(&key).is_some_and(|&b| b < cost) {
                continue;
            }
            for next in self.neighbors(&key) {
                let Some(tile) = self.get(&next) else {
                    continue;
                };
                if tile.impassable || blocked(&next) {
                    continue;
                }
                let total = cost.saturating_add(tile.movement_cost);
                if total > budget {
                    continue;
                }
                if best.get(&next).map_or(true, |&b| total < b) {
                    best.insert(next, total);
                    open.push(Reverse((total, next)));
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_map_dimensions() {
        let map = GameMap::new(6, 4);
        assert_eq!(map.len(), 24);
        assert!(map.contains(&TileKey::new(5, 3)));
        assert!(!map.contains(&TileKey::new(6, 0)));
    }

    #[test]
    fn test_neighbors_clipped_at_edges() {
        let map = GameMap::new(3, 3);
        assert_eq!(map.neighbors(&TileKey::new(0, 0)).count(), 2);
        assert_eq!(map.neighbors(&TileKey::new(1, 1)).count(), 4);
    }

    #[test]
    fn test_within_radius() {
        let map = GameMap::new(10, 10);
        let keys = map.within(TileKey::new(5, 5), 1);
        assert_eq!(keys.len(), 5);
        let corner = map.within(TileKey::new(0, 0), 2);
        assert_eq!(corner.len(), 6);
    }

    #[test]
    fn test_keys_in_order_row_major() {
        let map = GameMap::new(2, 2);
        let keys: Vec<_> = map.keys_in_order().collect();
        assert_eq!(
            keys,
            vec![TileKey::new(0, 0), TileKey::new(1, 0), TileKey::new(0, 1), TileKey::new(1, 1)]
        );
    }

    #[test]
    fn test_reachable_respects_costs_and_walls() {
        let mut map = GameMap::new(5, 1);
        map.get_mut(&TileKey::new(1, 0)).unwrap().set_terrain(TerrainKind::Forest);
        map.get_mut(&TileKey::new(3, 0)).unwrap().set_terrain(TerrainKind::Mountain);

        let reach = map.reachable(TileKey::new(0, 0), 3, |_| false);
        assert_eq!(reach.get(&TileKey::new(1, 0)), Some(&2));
        assert_eq!(reach.get(&TileKey::new(2, 0)), Some(&3));
        assert!(!reach.contains_key(&TileKey::new(3, 0)));
        assert!(!reach.contains_key(&TileKey::new(4, 0)));
    }

    #[test]
    fn test_reachable_blocked_tiles() {
        let map = GameMap::new(3, 1);
        let blocker = TileKey::new(1, 0);
        let reach = map.reachable(TileKey::new(0, 0), 5, |k| *k == blocker);
        assert!(!reach.contains_key(&blocker));
        assert!(!reach.contains_key(&TileKey::new(2, 0)));
    }
}
