pub mod renderer;

pub use renderer::{HudInfo, Renderer, world_to_text};
