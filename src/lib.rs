//! Animated retained-state drawing on top of immediate-mode painting.
//!
//! A scene is repainted from scratch every frame. Paints are grouped into
//! [`Snippet`]s with a stable [`SnippetKey`]; every number a snippet routes
//! through the [`ViewContext`] is smoothed toward its new value, new snippets
//! fade in and snippets that stop being painted fade out at their last
//! position before they are dropped.

pub mod affine;
pub mod canvas;
pub mod context;
pub mod error;
pub mod interp;
pub mod path;
pub mod recorder;
pub mod registry;
pub mod renderer;
pub mod snippet;
pub mod surface;
pub mod tracker;
pub mod view;

pub use affine::Affine;
pub use canvas::{SceneCanvas, SceneState};
pub use context::{Hit, ViewContext};
pub use error::Error;
pub use interp::{Intermediate, Timing};
pub use path::Path;
pub use recorder::RecordingSurface;
pub use registry::{DrawManager, SnippetKey, SnippetState};
pub use renderer::FrameSurface;
pub use snippet::{Replay, Scene, Snippet};
pub use surface::{Font, LoadedPicture, Picture, Surface, TextAlign, TextBaseline};
pub use tracker::Tracked;
pub use view::{Cursor, FrameOutcome, PointerEvent, PointerKind, View};
