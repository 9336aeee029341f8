use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::app::Scene;

use super::PixelFrame;

/// Owns the GPU-backed pixel buffer. The buffer keeps a fixed logical size and
/// is scaled onto the window surface, so resizing never changes scene coordinates.
pub struct Renderer {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(width, height, surface)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn render_scene(&mut self, scene: &mut dyn Scene) -> Result<(), Error> {
        let (width, height) = (self.width, self.height);
        match PixelFrame::new(self.pixels.frame_mut(), width, height) {
            Some(mut frame) => scene.render(&mut frame),
            None => warn!(width, height, "pixel_buffer_size_mismatch"),
        }
        self.pixels.render()
    }
}
