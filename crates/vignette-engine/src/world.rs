//! A tile grid implementing the spatial service for headless scenes.
//!
//! The map is `width` by `height` unit tiles. Tile `(x, y)` spans
//! `[x, x + 1)` on both axes and an actor stands on the tile nearest to
//! its position. Tiles can be blocked outright (walls, water) or hold a
//! static obstacle; other actors are mobile obstacles tracked from the
//! actor registry.
//!
//! Path finding is a breadth-first search over the four-connected grid.
//! Mobile obstacles are ignored when planning since they may have moved
//! by the time the walker arrives; collisions with them are resolved by
//! the controlling event instead.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;
use vignette_core::actor::{Actor, ActorRegistry};
use vignette_core::services::SpatialService;
use vignette_types::{ActorId, Collision, CollisionKind, MapPosition, ObjectId, Obstacle, ObstacleKind};

/// Integer tile coordinates.
type Tile = (u32, u32);

/// Distance a collision adjustment slides the actor sideways.
const ADJUST_STEP: f64 = 0.25;

/// How close an obstacle must be to a position to occupy it.
const OCCUPANCY_TOLERANCE: f64 = 0.5;

/// A static object placed on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlacedObject {
    tile: Tile,
    position: MapPosition,
}

/// The walkable grid of the current map.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    width: u32,
    height: u32,
    blocked: BTreeSet<Tile>,
    objects: BTreeMap<ObjectId, PlacedObject>,
    /// Last known position of every actor, refreshed each tick.
    actors: BTreeMap<ActorId, MapPosition>,
}

impl GridWorld {
    /// Create an open grid of `width` by `height` tiles.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blocked: BTreeSet::new(),
            objects: BTreeMap::new(),
            actors: BTreeMap::new(),
        }
    }

    /// Grid width in tiles.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Mark a tile as impassable. Tiles outside the grid are ignored.
    pub fn block_tile(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            self.blocked.insert((x, y));
        }
    }

    /// Return true if the tile is impassable map geometry.
    pub fn is_blocked(&self, x: u32, y: u32) -> bool {
        self.blocked.contains(&(x, y))
    }

    /// Place a static object on the tile under `position`.
    ///
    /// Returns false if the position lies outside the grid.
    pub fn place_object(&mut self, object: ObjectId, position: MapPosition) -> bool {
        let Some(tile) = self.tile_at(position) else {
            return false;
        };
        self.objects.insert(object, PlacedObject { tile, position });
        true
    }

    /// Remove a static object, returning true if it was placed.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        self.objects.remove(&object).is_some()
    }

    /// Refresh the mobile obstacles from the actor registry.
    pub fn sync_actors(&mut self, actors: &ActorRegistry) {
        self.actors = actors
            .iter()
            .map(|actor| (actor.id(), actor.position))
            .collect();
    }

    /// Move every moving actor along its facing for one tick.
    ///
    /// An actor whose next position would collide stays where it is and the
    /// collision is returned so the caller can route it to the actor's
    /// controlling event.
    pub fn step_actors(
        &mut self,
        actors: &mut ActorRegistry,
        elapsed_ms: u32,
    ) -> Vec<(ActorId, Collision)> {
        self.sync_actors(actors);

        let mut collisions = Vec::new();
        for actor in actors.iter_mut() {
            if !actor.moving {
                continue;
            }
            let distance = actor.distance_moved(elapsed_ms);
            let (dx, dy) = actor.facing.step();
            let next = MapPosition::new(
                actor.position.x + dx * distance,
                actor.position.y + dy * distance,
            );

            if let Some(collision) = self.detect_collision(actor, next) {
                debug!(actor = %actor.id(), kind = ?collision.kind, "Actor blocked");
                collisions.push((actor.id(), collision));
                continue;
            }
            actor.position = next;
            self.actors.insert(actor.id(), next);
        }
        collisions
    }

    /// The tile an actor standing at `position` occupies, or `None` off
    /// the grid.
    fn tile_at(&self, position: MapPosition) -> Option<Tile> {
        let x = tile_index(position.x + 0.5, self.width)?;
        let y = tile_index(position.y + 0.5, self.height)?;
        Some((x, y))
    }

    fn is_passable(&self, tile: Tile) -> bool {
        !self.blocked.contains(&tile) && !self.objects.values().any(|object| object.tile == tile)
    }

    fn neighbors(&self, (x, y): Tile) -> Vec<Tile> {
        let candidates = [
            x.checked_sub(1).map(|left| (left, y)),
            x.checked_add(1).filter(|&right| right < self.width).map(|right| (right, y)),
            y.checked_sub(1).map(|up| (x, up)),
            y.checked_add(1).filter(|&down| down < self.height).map(|down| (x, down)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|&tile| self.is_passable(tile))
            .collect()
    }

    /// Breadth-first search from `start` to `goal`, excluding `start`.
    fn search(&self, start: Tile, goal: Tile) -> Option<Vec<Tile>> {
        let mut prev: BTreeMap<Tile, Tile> = BTreeMap::new();
        let mut visited = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                break;
            }
            for neighbor in self.neighbors(current) {
                if visited.insert(neighbor) {
                    prev.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        if !prev.contains_key(&goal) {
            return None;
        }

        let mut path = VecDeque::new();
        let mut current = goal;
        while current != start {
            path.push_front(current);
            let Some(&predecessor) = prev.get(&current) else {
                return None;
            };
            current = predecessor;
        }
        Some(path.into_iter().collect())
    }
}

/// Index of the unit cell containing `value`, if it lies in `[0, extent)`.
fn tile_index(value: f64, extent: u32) -> Option<u32> {
    (0..extent).find(|&index| {
        let low = f64::from(index);
        value >= low && value < low + 1.0
    })
}

fn tile_origin((x, y): Tile) -> MapPosition {
    MapPosition::new(f64::from(x), f64::from(y))
}

impl SpatialService for GridWorld {
    fn find_path(&mut self, actor: &Actor, destination: MapPosition) -> Vec<MapPosition> {
        let (Some(start), Some(goal)) = (self.tile_at(actor.position), self.tile_at(destination))
        else {
            return Vec::new();
        };
        if !self.is_passable(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![destination];
        }

        let Some(tiles) = self.search(start, goal) else {
            return Vec::new();
        };

        // Walk tile origins, then finish on the exact destination.
        let mut path: Vec<MapPosition> = tiles.into_iter().map(tile_origin).collect();
        if let Some(last) = path.last_mut() {
            *last = destination;
        }
        debug!(actor = %actor.id(), waypoints = path.len(), "Path found");
        path
    }

    fn detect_collision(&self, actor: &Actor, position: MapPosition) -> Option<Collision> {
        let Some(tile) = self.tile_at(position) else {
            return Some(Collision::geometry(CollisionKind::Boundary));
        };
        if self.blocked.contains(&tile) {
            return Some(Collision::geometry(CollisionKind::Grid));
        }
        if let Some((&object, _)) = self.objects.iter().find(|(_, placed)| placed.tile == tile) {
            return Some(Collision::object(Obstacle {
                object,
                kind: ObstacleKind::Static,
            }));
        }

        let other = self.actors.iter().find(|&(&id, other)| {
            id != actor.id()
                && (other.x - position.x).abs() < 1.0
                && (other.y - position.y).abs() < 1.0
        });
        other.map(|(&id, _)| {
            Collision::object(Obstacle {
                object: ObjectId(id.into_inner()),
                kind: ObstacleKind::Mobile,
            })
        })
    }

    fn adjust_around_collision(&mut self, actor: &mut Actor, _collision: &Collision) -> bool {
        let (dx, dy) = actor.facing.step();
        let sides = [(-dy, dx), (dy, -dx)];

        for (side_x, side_y) in sides {
            let candidate = MapPosition::new(
                actor.position.x + side_x * ADJUST_STEP,
                actor.position.y + side_y * ADJUST_STEP,
            );
            if self.detect_collision(actor, candidate).is_none() {
                actor.position = candidate;
                self.actors.insert(actor.id(), candidate);
                return true;
            }
        }
        false
    }

    fn is_position_occupied(&self, position: MapPosition, obstacle: &Obstacle) -> bool {
        let occupied_at = match obstacle.kind {
            ObstacleKind::Static => self.objects.get(&obstacle.object).map(|placed| placed.position),
            ObstacleKind::Mobile => self
                .actors
                .get(&ActorId(obstacle.object.into_inner()))
                .copied(),
        };
        occupied_at.is_some_and(|occupied| occupied.is_within(&position, OCCUPANCY_TOLERANCE))
    }
}
