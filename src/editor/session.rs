//! One live editing context: a background image, a caption and its style.

use crate::assets::decode::PreparedImage;
use crate::assets::placeholder::escape_xml;
use crate::editor::viewport::Viewport;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::FrameRGBA;
use crate::render::compositor::{Background, Compositor, LayoutMetrics, Scene};
use crate::text::engine::TextShaper;
use crate::text::linebreak::{Line, break_lines};
use crate::text::runs::extract_tokens;
use crate::text::style::CaptionStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) u64);

/// Identifies one image load. Deliveries carrying any other ticket are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub(crate) session: SessionId,
    pub(crate) seq: u64,
}

#[derive(Clone, Debug)]
pub enum ImageState {
    Unloaded,
    Loading {
        ticket: LoadTicket,
    },
    Ready {
        image: PreparedImage,
        viewport: Viewport,
        ticket: LoadTicket,
    },
    Failed {
        message: String,
    },
}

impl ImageState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Message drawn over the placeholder when the background cannot be loaded.
pub const IMAGE_FAILED_MESSAGE: &str = "Image failed to load";

#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    canvas: Canvas,
    metrics: LayoutMetrics,
    pub(crate) style: CaptionStyle,
    caption: String,
    body: String,
    image_url: String,
    pub(crate) image: ImageState,
    next_seq: u64,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        canvas: Canvas,
        metrics: LayoutMetrics,
        style: CaptionStyle,
        image_url: String,
        caption: String,
        body: String,
    ) -> Self {
        Self {
            id,
            canvas,
            metrics,
            style,
            caption,
            body,
            image_url,
            image: ImageState::Unloaded,
            next_seq: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Current caption markup as typed by the user.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub(crate) fn set_caption(&mut self, markup: String) {
        self.caption = markup;
    }

    /// Post body, display only.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body escaped for HTML with line breaks kept as `<br>`.
    pub fn body_preview_html(&self) -> String {
        escape_xml(&self.body)
            .replace("\r\n", "\n")
            .replace('\n', "<br>")
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn image(&self) -> &ImageState {
        &self.image
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        match &self.image {
            ImageState::Ready { viewport, .. } => Some(viewport),
            _ => None,
        }
    }

    pub(crate) fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        match &mut self.image {
            ImageState::Ready { viewport, .. } => Some(viewport),
            _ => None,
        }
    }

    /// Enter `Loading` with a fresh ticket, superseding any earlier one.
    pub(crate) fn begin_load(&mut self) -> LoadTicket {
        self.next_seq += 1;
        let ticket = LoadTicket {
            session: self.id,
            seq: self.next_seq,
        };
        self.image = ImageState::Loading { ticket };
        ticket
    }

    /// Whether `ticket` is the load this session is waiting on.
    pub fn awaits(&self, ticket: LoadTicket) -> bool {
        matches!(self.image, ImageState::Loading { ticket: t } if t == ticket)
    }

    pub(crate) fn finish_load(
        &mut self,
        ticket: LoadTicket,
        image: PreparedImage,
    ) -> CaptionResult<()> {
        let max = u32::from(u16::MAX);
        if image.width > max || image.height > max {
            return Err(CaptionError::image_load(format!(
                "image {}x{} exceeds {max}x{max}",
                image.width, image.height
            )));
        }
        let viewport = Viewport::cover(self.canvas, image.width, image.height)?;
        self.image = ImageState::Ready {
            image,
            viewport,
            ticket,
        };
        Ok(())
    }

    pub(crate) fn fail_load(&mut self, message: impl Into<String>) {
        self.image = ImageState::Failed {
            message: message.into(),
        };
    }

    /// Extract style runs from the caption and wrap them to the text column.
    pub fn layout(&self, shaper: &mut dyn TextShaper) -> Vec<Line> {
        let tokens = extract_tokens(&self.caption, &self.style);
        break_lines(
            &tokens,
            self.style.font_size as f32,
            self.metrics.max_line_width(self.canvas),
            shaper,
        )
    }

    /// Render the current state. Reads the session only.
    pub fn render(
        &self,
        compositor: &mut Compositor,
        shaper: &mut dyn TextShaper,
    ) -> CaptionResult<FrameRGBA> {
        let background = match &self.image {
            ImageState::Unloaded | ImageState::Loading { .. } => Background::Pending,
            ImageState::Ready {
                image, viewport, ..
            } => Background::Image {
                image,
                transform: viewport.transform(),
            },
            ImageState::Failed { .. } => Background::Failed {
                message: IMAGE_FAILED_MESSAGE,
            },
        };
        let lines = match background {
            Background::Failed { .. } => Vec::new(),
            _ => self.layout(shaper),
        };
        let scene = Scene {
            canvas: self.canvas,
            metrics: &self.metrics,
            style: &self.style,
            background,
            lines: &lines,
        };
        compositor.render(&scene, shaper)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
