//! Placement of food, obstacles and power-ups into free cells.
//!
//! Every placement first samples [`SPAWN_ATTEMPTS`] uniformly random cells and
//! then falls back to a deterministic spiral walk outward from the grid
//! center, so a free cell is found whenever one exists.

use log::warn;
use rand::Rng;

use crate::config::{EMERGENCY_FOOD_POSITION, OBSTACLE_SAFE_RADIUS, SPAWN_ATTEMPTS};
use crate::food::{Food, FoodKind};
use crate::grid::GridWorld;
use crate::obstacle::{Obstacle, ObstacleKind};
use crate::power_up::{PowerUp, PowerUpKind};
use crate::snake::{Position, Snake};

/// Borrowed view of everything that currently occupies a cell.
#[derive(Debug, Clone, Copy)]
pub struct Occupancy<'a> {
    pub snake: &'a Snake,
    pub foods: &'a [Food],
    pub obstacles: &'a [Obstacle],
    pub power_ups: &'a [PowerUp],
}

impl Occupancy<'_> {
    /// Returns true when any entity sits on `position`.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.snake.occupies(position)
            || self.foods.iter().any(|food| food.position == position)
            || self.obstacles.iter().any(|obstacle| obstacle.position == position)
            || self.power_ups.iter().any(|power_up| power_up.position == position)
    }
}

/// Finds free cells on one grid.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPlanner {
    grid: GridWorld,
}

impl SpawnPlanner {
    #[must_use]
    pub fn new(grid: GridWorld) -> Self {
        Self { grid }
    }

    /// Places one food, always succeeding.
    ///
    /// On a completely full board the food lands on
    /// [`EMERGENCY_FOOD_POSITION`] even if that overlaps another entity.
    pub fn spawn_food<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        occupancy: &Occupancy<'_>,
        special_food_chance: f64,
    ) -> Food {
        let kind = choose_food_kind(rng, special_food_chance);
        let position = self.find_free_cell(rng, occupancy, false).unwrap_or_else(|| {
            warn!(
                "no free cell for food on {}x{} grid, using emergency position",
                self.grid.size().width,
                self.grid.size().height
            );
            EMERGENCY_FOOD_POSITION
        });

        Food::new(position, kind)
    }

    /// Places one interior obstacle outside the protected center area.
    pub fn spawn_obstacle<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        occupancy: &Occupancy<'_>,
    ) -> Option<Obstacle> {
        let Some(position) = self.find_free_cell(rng, occupancy, true) else {
            warn!("no free cell left for an obstacle");
            return None;
        };

        Some(Obstacle {
            position,
            kind: ObstacleKind::random(rng),
        })
    }

    /// Places one power-up of a random kind.
    pub fn spawn_power_up<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        occupancy: &Occupancy<'_>,
    ) -> Option<PowerUp> {
        let Some(position) = self.find_free_cell(rng, occupancy, false) else {
            warn!("no free cell left for a power-up");
            return None;
        };

        Some(PowerUp::new(position, PowerUpKind::random(rng)))
    }

    /// Random search followed by the spiral fallback.
    pub fn find_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        occupancy: &Occupancy<'_>,
        protect_center: bool,
    ) -> Option<Position> {
        let size = self.grid.size();
        let is_free = |position: Position| {
            !occupancy.is_occupied(position)
                && !(protect_center && self.is_protected(position))
        };

        for _ in 0..SPAWN_ATTEMPTS {
            let candidate = Position {
                x: rng.gen_range(0..i32::from(size.width)),
                y: rng.gen_range(0..i32::from(size.height)),
            };
            if is_free(candidate) {
                return Some(candidate);
            }
        }

        self.spiral_from_center().find(|position| is_free(*position))
    }

    /// Visits every cell once, ring by ring outward from the center.
    pub fn spiral_from_center(&self) -> impl Iterator<Item = Position> {
        let grid = self.grid;
        let center = grid.center();
        let size = grid.size();
        let max_radius = i32::from(size.width.max(size.height));

        (0..=max_radius)
            .flat_map(move |radius| ring(center, radius))
            .filter(move |position| grid.contains(*position))
    }

    fn is_protected(&self, position: Position) -> bool {
        let center = self.grid.center();
        (position.x - center.x).abs() <= OBSTACLE_SAFE_RADIUS
            && (position.y - center.y).abs() <= OBSTACLE_SAFE_RADIUS
    }
}

/// Cells at Chebyshev distance `radius` from `center`, clockwise from the
/// top-left corner.
fn ring(center: Position, radius: i32) -> Vec<Position> {
    if radius == 0 {
        return vec![center];
    }

    let (left, right) = (center.x - radius, center.x + radius);
    let (top, bottom) = (center.y - radius, center.y + radius);
    let mut cells = Vec::with_capacity(usize::try_from(radius * 8).unwrap_or_default());

    cells.extend((left..=right).map(|x| Position { x, y: top }));
    cells.extend((top + 1..=bottom).map(|y| Position { x: right, y }));
    cells.extend((left..right).rev().map(|x| Position { x, y: bottom }));
    cells.extend((top + 1..bottom).rev().map(|y| Position { x: left, y }));
    cells
}

/// Rolls the food kind for one spawn.
///
/// With probability `special_food_chance` one of [`FoodKind::SPECIAL`] is
/// drawn uniformly, otherwise the food is normal.
pub fn choose_food_kind<R: Rng + ?Sized>(rng: &mut R, special_food_chance: f64) -> FoodKind {
    if rng.gen_bool(special_food_chance.clamp(0.0, 1.0)) {
        FoodKind::SPECIAL[rng.gen_range(0..FoodKind::SPECIAL.len())]
    } else {
        FoodKind::Normal
    }
}
