mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    AssetError, BlendMode, DrawSurface, PixelFrame, PixelRect, Renderer, Rgba, Sprite,
    SpriteCache, SpriteLoad,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, Vec2};
