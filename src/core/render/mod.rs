//=========================================================================
// Render Collaborators
//=========================================================================
//
// Everything the scene graph needs from the outside world to draw:
//
//   renderer      → Renderer trait + Color
//   texture       → Texture / Frame / FrameSequence, ResourceLoader,
//                   TextureCache
//   async_loader  → worker-thread loading, main-thread delivery
//
//=========================================================================

pub mod async_loader;
pub mod renderer;
pub mod texture;

#[cfg(test)]
pub(crate) mod recording;

pub use async_loader::{AsyncLoader, LoadCallback};
pub use renderer::{Color, Renderer};
pub use texture::{Frame, FrameSequence, Resource, ResourceLoader, Texture, TextureCache};
