use crate::render::Renderer;
use crate::types::Direction;
use crate::world::World;
use log::info;
use macroquad::prelude::{KeyCode, get_frame_time, is_key_pressed, next_frame};

/// Owns the frame loop: maps key presses to simulation intents, advances
/// the world by real frame time, and redraws it.
pub struct Game {
    world: World,
    renderer: Renderer,
}

impl Game {
    pub fn new(world: World, renderer: Renderer) -> Self {
        Game { world, renderer }
    }

    pub async fn run(&mut self) {
        info!("Starting main loop...");

        loop {
            if is_key_pressed(KeyCode::Escape) {
                break;
            }
            if let Some(dir) = pressed_direction() {
                self.steer(dir);
            }
            if is_key_pressed(KeyCode::P) {
                let outcome = self.world.fire();
                crate::debug_fire!("fire key: {:?}", outcome);
            }

            self.world.advance(get_frame_time());
            self.renderer.draw_frame(&self.world);
            next_frame().await;
        }

        info!("Exiting Gridtank.");
    }

    /// Two-step control scheme: a directional key first rotates the tank
    /// in place; a repeated press in the facing direction translates.
    fn steer(&mut self, dir: Direction) {
        if self.world.tank().facing == dir {
            let _ = self.world.move_tank(dir);
        } else {
            self.world.turn_tank(dir);
        }
    }
}

// a/w/d/s keydown to movement intent; other keys are ignored
fn pressed_direction() -> Option<Direction> {
    if is_key_pressed(KeyCode::A) {
        Some(Direction::Left)
    } else if is_key_pressed(KeyCode::W) {
        Some(Direction::Top)
    } else if is_key_pressed(KeyCode::D) {
        Some(Direction::Right)
    } else if is_key_pressed(KeyCode::S) {
        Some(Direction::Bottom)
    } else {
        None
    }
}
