mod frame;
mod renderer;
mod sprite;
mod surface;
mod text;

pub use frame::PixelFrame;
pub use renderer::Renderer;
pub use sprite::{AssetError, Sprite, SpriteCache, SpriteLoad};
pub use surface::{BlendMode, DrawSurface, PixelRect, Rgba};
