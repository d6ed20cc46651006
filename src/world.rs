use crate::config;
use crate::config::{SHELL_SIZE, TANK_SIZE, WALL_BORDER};
use crate::field::Field;
use crate::map;
use crate::tank::{FootprintTable, Tank};
use crate::types::{Cell, CellPos, Direction, FireOutcome, MoveOutcome, Shell};
use log::info;
use thiserror::Error;

/// Construction-time failures. Steady-state rejections (blocked moves,
/// throttled fires) are ordinary outcomes, not errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorldError {
    #[error("{rows}x{cols} cells cannot hold the wall border and tank footprint")]
    FieldTooSmall { rows: usize, cols: usize },
    #[error("generated walls overlap the tank spawn footprint")]
    SpawnBlocked,
}

/// Tunables for building a world.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub width_px: u32,
    pub height_px: u32,
    pub cell_px: u32,
    pub obstacle_density: f32,
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width_px: config::FIELD_WIDTH_PX,
            height_px: config::FIELD_HEIGHT_PX,
            cell_px: config::CELL_SIZE_PX,
            obstacle_density: config::OBSTACLE_DENSITY,
            seed: 0,
        }
    }
}

/// One simulation session: the occupancy grid, the tank, at most one live
/// shell, and the fire-rate limiter. The caller owns the value and drives
/// it through [`World::advance`]; there are no wall-clock timers.
#[derive(Debug)]
pub struct World {
    field: Field,
    footprints: FootprintTable,
    tank: Tank,
    shell: Option<Shell>,
    cooldown_remaining: f32,
    shell_timer: f32,
}

impl World {
    pub fn new(cfg: WorldConfig) -> Result<Self, WorldError> {
        let mut field = Field::from_pixels(cfg.width_px, cfg.height_px, cfg.cell_px);

        let needed_rows = 2 * WALL_BORDER + config::SPAWN_BOTTOM_MARGIN + TANK_SIZE;
        let needed_cols = 2 * WALL_BORDER + TANK_SIZE;
        if field.rows() < needed_rows || field.cols() < needed_cols {
            return Err(WorldError::FieldTooSmall {
                rows: field.rows(),
                cols: field.cols(),
            });
        }

        // Bottom-center spawn, facing up at the open arena
        let spawn = CellPos::new(
            field.rows() - WALL_BORDER - config::SPAWN_BOTTOM_MARGIN - TANK_SIZE,
            (field.cols() - TANK_SIZE) / 2,
        );

        map::generate(&mut field, spawn, cfg.obstacle_density, cfg.seed);
        if !field.rect_is_empty(spawn, TANK_SIZE, TANK_SIZE) {
            return Err(WorldError::SpawnBlocked);
        }

        let footprints = FootprintTable::new();
        let tank = Tank::new(spawn, Direction::Top);
        field.stamp(footprints.for_facing(tank.facing), tank.pos, Cell::Tank);

        info!(
            "World created: {}x{} cells, tank at ({}, {})",
            field.rows(),
            field.cols(),
            tank.pos.row,
            tank.pos.col
        );

        Ok(World {
            field,
            footprints,
            tank,
            shell: None,
            cooldown_remaining: 0.0,
            shell_timer: 0.0,
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn shell(&self) -> Option<&Shell> {
        self.shell.as_ref()
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Rotates in place: same origin, different footprint bitmap. No
    /// collision check is performed for turning, only for translating.
    pub fn turn_tank(&mut self, dir: Direction) {
        self.field
            .erase_rect(self.tank.pos, TANK_SIZE, TANK_SIZE, Cell::Tank);
        self.tank.facing = dir;
        self.field
            .stamp(self.footprints.for_facing(dir), self.tank.pos, Cell::Tank);
        crate::debug_move!("turned to {:?}", dir);
    }

    /// Attempts a one-cell translation in `dir`. The strip of cells just
    /// beyond the leading footprint edge must be fully clear; otherwise
    /// the tank stays put.
    pub fn move_tank(&mut self, dir: Direction) -> MoveOutcome {
        self.field
            .erase_rect(self.tank.pos, TANK_SIZE, TANK_SIZE, Cell::Tank);

        let outcome = if self.tank_edge_clear(dir) {
            self.tank.pos = self.tank.pos.shifted(dir);
            MoveOutcome::Moved
        } else {
            MoveOutcome::Blocked
        };

        self.field.stamp(
            self.footprints.for_facing(self.tank.facing),
            self.tank.pos,
            Cell::Tank,
        );
        crate::debug_move!(
            "{:?} {:?}, tank at ({}, {})",
            dir,
            outcome,
            self.tank.pos.row,
            self.tank.pos.col
        );
        outcome
    }

    fn tank_edge_clear(&self, dir: Direction) -> bool {
        let row = self.tank.pos.row as isize;
        let col = self.tank.pos.col as isize;
        let size = TANK_SIZE as isize;
        for i in 0..size {
            let (r, c) = match dir {
                Direction::Left => (row + i, col - 1),
                Direction::Right => (row + i, col + size),
                Direction::Top => (row - 1, col + i),
                Direction::Bottom => (row + size, col + i),
            };
            if self.field.occupied(r, c) {
                return false;
            }
        }
        true
    }

    /// Fires a shell from the muzzle if the limiter allows it and the
    /// spawn cells are clear. Starting the cooldown is tied to actually
    /// spawning a shell; rejected requests leave the limiter untouched.
    pub fn fire(&mut self) -> FireOutcome {
        if self.cooldown_remaining > 0.0 {
            crate::debug_fire!(
                "rejected: cooling down for {:.3}s",
                self.cooldown_remaining
            );
            return FireOutcome::Cooldown;
        }
        if self.shell.is_some() {
            crate::debug_fire!("rejected: shell still in flight");
            return FireOutcome::InFlight;
        }

        let Some(origin) = self.muzzle_origin() else {
            crate::debug_fire!("rejected: muzzle off grid");
            return FireOutcome::Blocked;
        };
        if !self.field.rect_is_empty(origin, SHELL_SIZE, SHELL_SIZE) {
            crate::debug_fire!("rejected: muzzle blocked");
            return FireOutcome::Blocked;
        }

        self.field
            .fill_rect(origin, SHELL_SIZE, SHELL_SIZE, Cell::Shell);
        self.shell = Some(Shell {
            pos: origin,
            dir: self.tank.facing,
        });
        self.shell_timer = 0.0;
        self.cooldown_remaining = config::FIRE_COOLDOWN_SECS;
        crate::debug_fire!(
            "shell away: ({}, {}) heading {:?}",
            origin.row,
            origin.col,
            self.tank.facing
        );
        FireOutcome::Fired
    }

    /// Top-left of the shell spawn rectangle: one cell beyond the tank's
    /// leading edge, centered on the perpendicular axis. `None` when the
    /// muzzle would land off the grid.
    fn muzzle_origin(&self) -> Option<CellPos> {
        let row = self.tank.pos.row as isize;
        let col = self.tank.pos.col as isize;
        let size = TANK_SIZE as isize;
        let shell = SHELL_SIZE as isize;
        let side = size / 2 - 1;

        let (r, c) = match self.tank.facing {
            Direction::Top => (row - shell, col + side),
            Direction::Bottom => (row + size, col + side),
            Direction::Left => (row + side, col - shell),
            Direction::Right => (row + side, col + size),
        };
        if r < 0 || c < 0 {
            return None;
        }
        Some(CellPos::new(r as usize, c as usize))
    }

    /// Advances simulated time: counts the fire cooldown down and steps
    /// the live shell once per elapsed step interval.
    pub fn advance(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }

        if self.shell.is_none() {
            return;
        }
        self.shell_timer += dt;
        while self.shell_timer >= config::SHELL_STEP_SECS {
            self.shell_timer -= config::SHELL_STEP_SECS;
            if !self.step_shell() {
                self.shell_timer = 0.0;
                break;
            }
        }
    }

    /// One shell cell-step. Returns false when the shell was destroyed.
    fn step_shell(&mut self) -> bool {
        let Some(shell) = self.shell else {
            return false;
        };

        if !self.shell_edge_clear(shell) {
            self.field
                .erase_rect(shell.pos, SHELL_SIZE, SHELL_SIZE, Cell::Shell);
            self.shell = None;
            crate::debug_shell!(
                "destroyed at ({}, {})",
                shell.pos.row,
                shell.pos.col
            );
            return false;
        }

        self.field
            .erase_rect(shell.pos, SHELL_SIZE, SHELL_SIZE, Cell::Shell);
        let next = Shell {
            pos: shell.pos.shifted(shell.dir),
            dir: shell.dir,
        };
        self.field
            .fill_rect(next.pos, SHELL_SIZE, SHELL_SIZE, Cell::Shell);
        self.shell = Some(next);
        true
    }

    /// Whether the full strip of cells beyond the shell's leading edge is
    /// clear. The strip spans the shell's whole width, so a wall corner
    /// covering half the edge still stops it.
    fn shell_edge_clear(&self, shell: Shell) -> bool {
        let row = shell.pos.row as isize;
        let col = shell.pos.col as isize;
        let size = SHELL_SIZE as isize;
        for i in 0..size {
            let (r, c) = match shell.dir {
                Direction::Left => (row + i, col - 1),
                Direction::Right => (row + i, col + size),
                Direction::Top => (row - 1, col + i),
                Direction::Bottom => (row + size, col + i),
            };
            if self.field.occupied(r, c) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    // 40x40-cell arena: spawn at row 22, col 14; shell muzzle (facing
    // TOP) at row 20, col 19.
    fn small_world() -> World {
        open_world(80, 80)
    }

    // 200x200-cell arena for long shell flights.
    fn large_world() -> World {
        open_world(400, 400)
    }

    fn open_world(width_px: u32, height_px: u32) -> World {
        World::new(WorldConfig {
            width_px,
            height_px,
            cell_px: 2,
            obstacle_density: 0.0,
            seed: 0,
        })
        .expect("open arena must construct")
    }

    // The two-step control scheme owned by the input mapper: a key in the
    // facing direction moves, any other key turns in place.
    fn press(world: &mut World, dir: Direction) {
        if world.tank().facing == dir {
            let _ = world.move_tank(dir);
        } else {
            world.turn_tank(dir);
        }
    }

    #[test]
    fn test_spawn_bottom_center_facing_top() {
        let world = small_world();
        assert_eq!(world.tank().pos, CellPos::new(22, 14));
        assert_eq!(world.tank().facing, Direction::Top);
        // Barrel tip is stamped at the footprint's top edge
        assert_eq!(world.field().get(CellPos::new(22, 19)), Cell::Tank);
    }

    #[test]
    fn test_move_into_open_space() {
        let mut world = small_world();
        assert_eq!(world.move_tank(Direction::Top), MoveOutcome::Moved);
        assert_eq!(world.tank().pos, CellPos::new(21, 14));
        // Footprint restamped at the new origin, old cells erased
        assert_eq!(world.field().get(CellPos::new(21, 19)), Cell::Tank);
        assert_eq!(world.field().get(CellPos::new(32, 14)), Cell::Empty);
    }

    #[test]
    fn test_move_into_wall_leaves_footprint_unchanged() {
        for dir in [
            Direction::Left,
            Direction::Top,
            Direction::Right,
            Direction::Bottom,
        ] {
            let mut world = small_world();
            world.turn_tank(dir);
            let mut guard = 0;
            while world.move_tank(dir) == MoveOutcome::Moved {
                guard += 1;
                assert!(guard < 100, "tank never reached a wall going {:?}", dir);
            }
            let pos = world.tank().pos;
            let snapshot = world.field().clone();
            assert_eq!(world.move_tank(dir), MoveOutcome::Blocked);
            assert_eq!(world.tank().pos, pos);
            assert_eq!(*world.field(), snapshot);
        }
    }

    #[test]
    fn test_turn_changes_footprint_not_position() {
        let mut world = small_world();
        let pos = world.tank().pos;
        let before = world.field().clone();

        world.turn_tank(Direction::Left);
        assert_eq!(world.tank().pos, pos);
        assert_ne!(*world.field(), before);

        // Turning twice to the same direction is idempotent
        let after_first = world.field().clone();
        world.turn_tank(Direction::Left);
        assert_eq!(world.tank().pos, pos);
        assert_eq!(*world.field(), after_first);
    }

    #[test]
    fn test_two_step_control_scheme() {
        let mut world = small_world();
        world.turn_tank(Direction::Left);

        // First press in a new direction only rotates
        press(&mut world, Direction::Top);
        assert_eq!(world.tank().pos, CellPos::new(22, 14));
        assert_eq!(world.tank().facing, Direction::Top);

        // Repeated presses translate one cell each
        press(&mut world, Direction::Top);
        assert_eq!(world.tank().pos, CellPos::new(21, 14));

        // The move is rejected once the top edge reaches the inner wall
        // boundary at row 2
        for _ in 0..19 {
            press(&mut world, Direction::Top);
        }
        assert_eq!(world.tank().pos, CellPos::new(2, 14));
        press(&mut world, Direction::Top);
        assert_eq!(world.tank().pos, CellPos::new(2, 14));
    }

    #[test]
    fn test_fire_spawns_shell_at_muzzle() {
        let mut world = small_world();
        assert_eq!(world.fire(), FireOutcome::Fired);

        let shell = world.shell().expect("shell should be live");
        assert_eq!(shell.pos, CellPos::new(20, 19));
        assert_eq!(shell.dir, Direction::Top);
        for r in 20..22 {
            for c in 19..21 {
                assert_eq!(world.field().get(CellPos::new(r, c)), Cell::Shell);
            }
        }
        assert_approx_eq!(world.cooldown_remaining(), config::FIRE_COOLDOWN_SECS);
    }

    #[test]
    fn test_fire_direction_is_captured_at_launch() {
        let mut world = large_world();
        assert_eq!(world.fire(), FireOutcome::Fired);
        let spawn_row = world.shell().expect("live shell").pos.row;

        // Rotating the tank after launch must not bend the trajectory
        world.turn_tank(Direction::Right);
        world.advance(config::SHELL_STEP_SECS);
        let shell = world.shell().expect("live shell");
        assert_eq!(shell.dir, Direction::Top);
        assert_eq!(shell.pos.row, spawn_row - 1);
    }

    #[test]
    fn test_fire_on_cooldown_is_ignored() {
        let mut world = small_world();
        assert_eq!(world.fire(), FireOutcome::Fired);

        let snapshot = world.field().clone();
        assert_eq!(world.fire(), FireOutcome::Cooldown);
        assert_eq!(*world.field(), snapshot);

        // The rejection must not restart the cooldown timer
        world.advance(0.4);
        assert_eq!(world.fire(), FireOutcome::Cooldown);
        assert_approx_eq!(
            world.cooldown_remaining(),
            config::FIRE_COOLDOWN_SECS - 0.4,
            1e-5
        );
    }

    #[test]
    fn test_fire_while_shell_in_flight_is_rejected() {
        let mut world = large_world();
        assert_eq!(world.fire(), FireOutcome::Fired);

        // The cooldown expires long before the shell crosses the arena
        world.advance(config::FIRE_COOLDOWN_SECS);
        assert_eq!(world.cooldown_remaining(), 0.0);
        assert!(world.shell().is_some());
        assert_eq!(world.fire(), FireOutcome::InFlight);

        // Once the shell resolves, firing works again
        world.advance(2.0);
        assert!(world.shell().is_none());
        assert_eq!(world.fire(), FireOutcome::Fired);
    }

    #[test]
    fn test_shell_advances_one_cell_per_step() {
        let mut world = large_world();
        assert_eq!(world.fire(), FireOutcome::Fired);
        let spawn_row = world.shell().expect("live shell").pos.row;

        for step in 1..=5 {
            world.advance(config::SHELL_STEP_SECS);
            let shell = world.shell().expect("live shell");
            assert_eq!(shell.pos.row, spawn_row - step);
        }
    }

    #[test]
    fn test_shell_step_time_accumulates_across_frames() {
        let mut world = large_world();
        assert_eq!(world.fire(), FireOutcome::Fired);
        let spawn_row = world.shell().expect("live shell").pos.row;

        // A frame shorter than the step interval moves nothing; the
        // remainder carries into the next frame
        world.advance(0.006);
        assert_eq!(world.shell().expect("live shell").pos.row, spawn_row);
        world.advance(0.006);
        assert_eq!(world.shell().expect("live shell").pos.row, spawn_row - 1);
        world.advance(0.006);
        assert_eq!(world.shell().expect("live shell").pos.row, spawn_row - 1);
    }

    #[test]
    fn test_shell_destroyed_at_wall() {
        let mut world = small_world();
        assert_eq!(world.fire(), FireOutcome::Fired);

        // Muzzle at row 20; the shell stops when its leading edge meets
        // the border wall at row 1, i.e. after 18 steps
        for _ in 0..18 {
            world.advance(config::SHELL_STEP_SECS);
        }
        let shell = world.shell().expect("live shell");
        assert_eq!(shell.pos, CellPos::new(2, 19));

        world.advance(config::SHELL_STEP_SECS);
        assert!(world.shell().is_none());
        for r in 2..4 {
            for c in 19..21 {
                assert_eq!(world.field().get(CellPos::new(r, c)), Cell::Empty);
            }
        }
        // The wall it struck is untouched
        assert_eq!(world.field().get(CellPos::new(1, 19)), Cell::Wall);
    }

    #[test]
    fn test_shell_stopped_by_half_covering_corner() {
        let mut world = large_world();
        assert_eq!(world.fire(), FireOutcome::Fired);
        let shell = *world.shell().expect("live shell");

        // A wall covering only one of the two leading cells still stops
        // the shell
        world.field.set(
            CellPos::new(shell.pos.row - 3, shell.pos.col + 1),
            Cell::Wall,
        );
        world.advance(2.0 * config::SHELL_STEP_SECS);
        assert_eq!(
            world.shell().expect("live shell").pos.row,
            shell.pos.row - 2
        );
        world.advance(config::SHELL_STEP_SECS);
        assert!(world.shell().is_none());
    }

    #[test]
    fn test_fire_into_adjacent_wall_is_ignored() {
        let mut world = small_world();
        // Block one muzzle cell; the fire request must not spawn a shell
        // nor start the cooldown
        world.field.set(CellPos::new(20, 19), Cell::Wall);

        assert_eq!(world.fire(), FireOutcome::Blocked);
        assert!(world.shell().is_none());
        assert_eq!(world.cooldown_remaining(), 0.0);

        // Clearing the blockage makes the same request succeed
        world.field.set(CellPos::new(20, 19), Cell::Empty);
        assert_eq!(world.fire(), FireOutcome::Fired);
    }

    #[test]
    fn test_one_fire_per_cooldown_window() {
        let mut world = small_world();
        assert_eq!(world.fire(), FireOutcome::Fired);
        world.advance(0.5);
        assert_eq!(world.fire(), FireOutcome::Cooldown);
        // Shell died against the border long ago; only the timer gates now
        world.advance(0.5);
        assert_eq!(world.fire(), FireOutcome::Fired);
    }

    #[test]
    fn test_field_too_small_is_rejected() {
        let result = World::new(WorldConfig {
            width_px: 20,
            height_px: 20,
            cell_px: 2,
            obstacle_density: 0.0,
            seed: 0,
        });
        assert!(matches!(result, Err(WorldError::FieldTooSmall { .. })));
    }
}
