//! Caption compositor: a rich-text caption and gradient scrim drawn over a pannable
//! background photo, rendered on the CPU and exported as a PNG data URI.
//!
//! - Open a session on an [`Editor`] and feed it [`EditorEvent`]s
//! - Read the current [`FrameRGBA`] after each accepted event
//! - Save through a [`SaveBackend`]
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod editor;
pub mod export;
mod foundation;
pub mod render;
pub mod text;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{CaptionError, CaptionResult};

pub use crate::assets::source::{FsImageSource, ImageSource};
pub use crate::config::EditorConfig;
pub use crate::editor::bindings::{Control, SessionHandle};
pub use crate::editor::controller::{DragState, Editor, EditorEvent};
pub use crate::editor::session::{ImageState, LoadTicket, Session};
pub use crate::editor::viewport::Viewport;
pub use crate::export::{DirectorySaveBackend, ExportArtifact, RpcSaveBackend, SaveBackend};
pub use crate::render::FrameRGBA;
pub use crate::render::compositor::{Compositor, LayoutMetrics};
pub use crate::text::engine::{FixedAdvanceShaper, ParleyTextEngine, TextShaper};
pub use crate::text::linebreak::{Line, StyleRun, break_lines};
pub use crate::text::runs::{CaptionToken, StyledWord, extract_tokens};
pub use crate::text::style::{CaptionStyle, FontSlant, FontWeight, TextAlign};
