use crate::config::{OBSTACLE_BLOCK, SPAWN_CLEARANCE, TANK_SIZE, WALL_BORDER};
use crate::field::Field;
use crate::types::{Cell, CellPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stamps the static wall terrain: a solid border ring plus randomly
/// scattered obstacle blocks. The spawn footprint (padded by a clearance
/// margin) is kept clear so the tank can always be placed.
pub fn generate(field: &mut Field, spawn: CellPos, density: f32, seed: u64) {
    stamp_border(field);
    scatter_obstacles(field, spawn, density, seed);
}

fn stamp_border(field: &mut Field) {
    let rows = field.rows();
    let cols = field.cols();
    for r in 0..rows {
        for c in 0..cols {
            if r < WALL_BORDER || r >= rows - WALL_BORDER || c < WALL_BORDER || c >= cols - WALL_BORDER
            {
                field.set(CellPos::new(r, c), Cell::Wall);
            }
        }
    }
}

fn scatter_obstacles(field: &mut Field, spawn: CellPos, density: f32, seed: u64) {
    let rows = field.rows();
    let cols = field.cols();

    // Blocks must fit fully inside the interior
    if rows <= 2 * WALL_BORDER + OBSTACLE_BLOCK || cols <= 2 * WALL_BORDER + OBSTACLE_BLOCK {
        return;
    }

    let interior_cells = (rows - 2 * WALL_BORDER) * (cols - 2 * WALL_BORDER);
    let num_blocks = (interior_cells as f32 * density).floor() as u32;
    log::info!("Placing {} obstacle blocks (seed {})...", num_blocks, seed);

    // Spawn footprint padded by the clearance margin
    let clear_r0 = spawn.row.saturating_sub(SPAWN_CLEARANCE);
    let clear_c0 = spawn.col.saturating_sub(SPAWN_CLEARANCE);
    let clear_r1 = spawn.row + TANK_SIZE + SPAWN_CLEARANCE;
    let clear_c1 = spawn.col + TANK_SIZE + SPAWN_CLEARANCE;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut placed = 0;
    for _ in 0..num_blocks {
        let r = rng.gen_range(WALL_BORDER..rows - WALL_BORDER - OBSTACLE_BLOCK);
        let c = rng.gen_range(WALL_BORDER..cols - WALL_BORDER - OBSTACLE_BLOCK);

        // Skip blocks that would intrude on the padded spawn rectangle
        if r < clear_r1 && r + OBSTACLE_BLOCK > clear_r0 && c < clear_c1 && c + OBSTACLE_BLOCK > clear_c0
        {
            continue;
        }

        field.fill_rect(CellPos::new(r, c), OBSTACLE_BLOCK, OBSTACLE_BLOCK, Cell::Wall);
        placed += 1;
    }
    crate::debug_map!("{} of {} obstacle blocks placed", placed, num_blocks);
}
