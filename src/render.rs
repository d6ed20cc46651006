use crate::config::FIRE_COOLDOWN_SECS;
use crate::types::{Cell, CellPos};
use crate::world::World;
use macroquad::prelude::*;

const BACKGROUND: Color = Color::new(0.05, 0.05, 0.05, 1.0);

fn color_from_rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba(r, g, b, 255)
}

// Cell state to color; empty cells show the background through
fn cell_color(cell: Cell) -> Option<Color> {
    match cell {
        Cell::Empty => None,
        Cell::Wall => Some(color_from_rgb(0x60, 0x60, 0x60)),
        Cell::Tank => Some(color_from_rgb(0x00, 0x88, 0x00)),
        Cell::Shell => Some(color_from_rgb(0xd8, 0x78, 0x20)),
    }
}

// Handles drawing the occupancy grid with macroquad
pub struct Renderer {
    cell_px: f32,
}

impl Renderer {
    pub fn new(cell_px: u32) -> Self {
        Renderer {
            cell_px: cell_px as f32,
        }
    }

    pub fn draw_frame(&self, world: &World) {
        clear_background(BACKGROUND);

        let field = world.field();
        for r in 0..field.rows() {
            for c in 0..field.cols() {
                if let Some(color) = cell_color(field.get(CellPos::new(r, c))) {
                    draw_rectangle(
                        c as f32 * self.cell_px,
                        r as f32 * self.cell_px,
                        self.cell_px,
                        self.cell_px,
                        color,
                    );
                }
            }
        }

        self.draw_fire_indicator(world);
    }

    // Small readiness light in the corner: green when a fire request
    // would be accepted, amber while the limiter or a live shell gates it
    fn draw_fire_indicator(&self, world: &World) {
        let ready = world.cooldown_remaining() <= 0.0 && world.shell().is_none();
        let color = if ready {
            color_from_rgb(0x30, 0xd0, 0x30)
        } else {
            color_from_rgb(0xa0, 0x70, 0x10)
        };
        draw_rectangle(6.0, 6.0, 10.0, 10.0, color);

        if !ready {
            let fraction = (world.cooldown_remaining() / FIRE_COOLDOWN_SECS).clamp(0.0, 1.0);
            draw_rectangle(20.0, 9.0, 40.0 * fraction, 4.0, color);
        }
    }
}
