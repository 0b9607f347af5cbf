pub mod renderer;

pub use renderer::{DebugRenderer, PlainRenderer, Renderer};
