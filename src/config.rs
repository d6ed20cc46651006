//! Configuration constants for the tank arena.

// Field geometry
pub const FIELD_WIDTH_PX: u32 = 960; // Window width in pixels
pub const FIELD_HEIGHT_PX: u32 = 480;
pub const CELL_SIZE_PX: u32 = 2; // Side of one occupancy cell in pixels

// Entity geometry (grid cells)
pub const TANK_SIZE: usize = 12; // Side of the square tank footprint
pub const SHELL_SIZE: usize = 2; // Side of the square shell footprint

// Map layout
pub const WALL_BORDER: usize = 2; // Width of the solid border ring
pub const OBSTACLE_DENSITY: f32 = 0.002; // Fraction of interior cells seeding an obstacle block
pub const OBSTACLE_BLOCK: usize = 4; // Obstacle side length in cells
pub const SPAWN_CLEARANCE: usize = 4; // Obstacle-free margin around the spawn footprint

// Spawn placement
pub const SPAWN_BOTTOM_MARGIN: usize = 4; // Cells between the tank and the bottom border

// Timing (simulated seconds)
pub const SHELL_STEP_SECS: f32 = 0.010; // One shell cell-step per interval
pub const FIRE_COOLDOWN_SECS: f32 = 1.0; // Minimum time between successful fires
