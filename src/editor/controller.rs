//! Routes input events into the live session and keeps the canvas frame current.

use crate::assets::decode::decode_image;
use crate::assets::source::ImageSource;
use crate::config::EditorConfig;
use crate::editor::bindings::{Control, SessionHandle};
use crate::editor::fingerprint::{FrameFingerprint, fingerprint_session};
use crate::editor::session::{ImageState, LoadTicket, Session, SessionId};
use crate::export::{ExportArtifact, SaveBackend};
use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::FrameRGBA;
use crate::render::compositor::Compositor;
use crate::text::engine::TextShaper;
use crate::text::style::{FontSlant, FontWeight, TextAlign};

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    GradientColor(Rgba8),
    /// Clamped to `0..=1`.
    GradientOpacity(f32),
    FontSize(u32),
    LineHeight(u32),
    Align(TextAlign),
    Weight(FontWeight),
    Slant(FontSlant),
    TextColor(Rgba8),
    ShadowBlur(u32),
    CaptionEdited(String),
    /// Mouse press or touch start, in canvas pixels.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    ImageLoaded {
        ticket: LoadTicket,
        bytes: Vec<u8>,
    },
    ImageFailed {
        ticket: LoadTicket,
        message: String,
    },
}

impl EditorEvent {
    pub fn control(&self) -> Control {
        match self {
            Self::GradientColor(_) => Control::GradientColor,
            Self::GradientOpacity(_) => Control::GradientOpacity,
            Self::FontSize(_) => Control::FontSize,
            Self::LineHeight(_) => Control::LineHeight,
            Self::Align(_) => Control::Align,
            Self::Weight(_) => Control::Weight,
            Self::Slant(_) => Control::Slant,
            Self::TextColor(_) => Control::TextColor,
            Self::ShadowBlur(_) => Control::ShadowBlur,
            Self::CaptionEdited(_) => Control::Caption,
            Self::PointerDown(_) | Self::PointerMove(_) | Self::PointerUp | Self::PointerLeave => {
                Control::Pointer
            }
            Self::ImageLoaded { .. } | Self::ImageFailed { .. } => Control::ImageLoad,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// `start` is the pointer position minus the offset at press time.
    Dragging { start: Vec2 },
}

/// Map a pointer position on the displayed canvas element to canvas pixels, for hosts that
/// show the canvas scaled.
pub fn display_to_canvas(display: Point, display_size: (f64, f64), canvas_size: (f64, f64)) -> Point {
    let sx = if display_size.0 > 0.0 {
        canvas_size.0 / display_size.0
    } else {
        1.0
    };
    let sy = if display_size.1 > 0.0 {
        canvas_size.1 / display_size.1
    } else {
        1.0
    };
    Point::new(display.x * sx, display.y * sy)
}

pub struct Editor {
    config: EditorConfig,
    shaper: Box<dyn TextShaper>,
    compositor: Compositor,
    session: Option<Session>,
    handle: Option<SessionHandle>,
    drag: DragState,
    frame: Option<FrameRGBA>,
    rendered: Option<FrameFingerprint>,
    redraw_deferred: bool,
    render_count: u64,
    status: Option<String>,
    next_session: u64,
}

impl Editor {
    pub fn new(config: EditorConfig, shaper: Box<dyn TextShaper>) -> CaptionResult<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.placeholder_renderer());
        Ok(Self {
            config,
            shaper,
            compositor,
            session: None,
            handle: None,
            drag: DragState::Idle,
            frame: None,
            rendered: None,
            redraw_deferred: false,
            render_count: 0,
            status: None,
            next_session: 0,
        })
    }

    /// Editor whose shaper is built from the config's fonts.
    pub fn from_config(config: EditorConfig) -> CaptionResult<Self> {
        let shaper = config.build_shaper()?;
        Self::new(config, shaper)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_handle(&self) -> Option<&SessionHandle> {
        self.handle.as_ref()
    }

    pub fn session_handle_mut(&mut self) -> Option<&mut SessionHandle> {
        self.handle.as_mut()
    }

    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Result of the last save attempt.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Frames actually rasterized so far; redraws of unchanged state are not counted.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn redraw_deferred(&self) -> bool {
        self.redraw_deferred
    }

    /// Pointer position on a canvas displayed at `display_size`, in canvas pixels.
    pub fn canvas_point(&self, display: Point, display_size: (f64, f64)) -> Point {
        let canvas = self.config.canvas;
        display_to_canvas(
            display,
            display_size,
            (canvas.width_f64(), canvas.height_f64()),
        )
    }

    /// Start a session for `image_url`, tearing down the previous one first. The host fetches
    /// the image and answers with `ImageLoaded`/`ImageFailed` carrying the returned ticket.
    #[tracing::instrument(skip(self, caption, body))]
    pub fn open(
        &mut self,
        image_url: &str,
        caption: impl Into<String>,
        body: impl Into<String>,
    ) -> LoadTicket {
        self.close();

        self.next_session += 1;
        let id = SessionId(self.next_session);
        let mut session = Session::new(
            id,
            self.config.canvas,
            self.config.metrics,
            self.config.default_style.clone(),
            image_url.to_owned(),
            caption.into(),
            body.into(),
        );
        let ticket = session.begin_load();
        self.session = Some(session);
        self.handle = Some(SessionHandle::bind_all(id));
        // First frame waits for the background.
        self.redraw_deferred = true;
        ticket
    }

    /// Fetch the current session's image from `source` and deliver the outcome for `ticket`.
    pub fn load_with(
        &mut self,
        ticket: LoadTicket,
        source: &mut dyn ImageSource,
    ) -> CaptionResult<bool> {
        let Some(url) = self.session.as_ref().map(|s| s.image_url().to_owned()) else {
            return Ok(false);
        };
        let event = match source.fetch(&url) {
            Ok(bytes) => EditorEvent::ImageLoaded { ticket, bytes },
            Err(err) => EditorEvent::ImageFailed {
                ticket,
                message: err.to_string(),
            },
        };
        self.handle(event)
    }

    /// Restart the image load of the current session; earlier tickets become stale.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        let session = self.session.as_mut()?;
        let ticket = session.begin_load();
        self.drag = DragState::Idle;
        Some(ticket)
    }

    /// Dispose the live session, if any. Its bindings and pending loads go inert.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
        if let Some(session) = self.session.take() {
            tracing::debug!(session = session.id().0, "session closed");
        }
        self.drag = DragState::Idle;
        self.frame = None;
        self.rendered = None;
        self.redraw_deferred = false;
        self.status = None;
    }

    /// Apply one event. Returns whether it was accepted by the live session.
    pub fn handle(&mut self, event: EditorEvent) -> CaptionResult<bool> {
        let control = event.control();
        let bound = self
            .handle
            .as_ref()
            .is_some_and(|h| h.accepts(control));
        let Some(session) = self.session.as_mut().filter(|_| bound) else {
            tracing::debug!(?control, "event dropped: no active binding");
            return Ok(false);
        };

        match event {
            EditorEvent::GradientColor(c) => session.style.gradient_color = c,
            EditorEvent::GradientOpacity(v) => {
                session.style.gradient_opacity = if v.is_finite() {
                    v.clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }
            EditorEvent::FontSize(v) => session.style.font_size = v.max(1),
            EditorEvent::LineHeight(v) => session.style.line_height = v,
            EditorEvent::Align(a) => session.style.align = a,
            EditorEvent::Weight(w) => session.style.weight = w,
            EditorEvent::Slant(s) => session.style.slant = s,
            EditorEvent::TextColor(c) => session.style.text_color = c,
            EditorEvent::ShadowBlur(v) => session.style.shadow_blur = v,
            EditorEvent::CaptionEdited(markup) => session.set_caption(markup),
            EditorEvent::PointerDown(p) => {
                let Some(vp) = session.viewport() else {
                    return Ok(false);
                };
                self.drag = DragState::Dragging {
                    start: p.to_vec2() - vp.offset,
                };
                return Ok(true);
            }
            EditorEvent::PointerMove(p) => {
                let DragState::Dragging { start } = self.drag else {
                    return Ok(false);
                };
                let Some(vp) = session.viewport_mut() else {
                    return Ok(false);
                };
                if !vp.pan_to(p.to_vec2() - start) {
                    return Ok(true);
                }
            }
            EditorEvent::PointerUp | EditorEvent::PointerLeave => {
                self.drag = DragState::Idle;
                return Ok(true);
            }
            EditorEvent::ImageLoaded { ticket, bytes } => {
                if !session.awaits(ticket) {
                    tracing::debug!(?ticket, "stale image load ignored");
                    return Ok(false);
                }
                match decode_image(&bytes).and_then(|img| session.finish_load(ticket, img)) {
                    Ok(()) => tracing::debug!(url = session.image_url(), "image ready"),
                    Err(err) => {
                        tracing::warn!(url = session.image_url(), error = %err, "image unusable");
                        session.fail_load(err.to_string());
                    }
                }
                self.flush_deferred();
                return Ok(true);
            }
            EditorEvent::ImageFailed { ticket, message } => {
                if !session.awaits(ticket) {
                    tracing::debug!(?ticket, "stale image failure ignored");
                    return Ok(false);
                }
                tracing::warn!(url = session.image_url(), %message, "image load failed");
                session.fail_load(message);
                self.flush_deferred();
                return Ok(true);
            }
        }

        self.request_redraw();
        Ok(true)
    }

    /// Redraw now, or after the pending image load completes.
    fn request_redraw(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.image().is_loading() {
            self.redraw_deferred = true;
            tracing::debug!("redraw deferred until image load completes");
            return;
        }
        self.refresh();
    }

    fn flush_deferred(&mut self) {
        self.redraw_deferred = false;
        self.refresh();
    }

    /// Redraw, keeping the previous frame when rendering fails. The state change that asked
    /// for the redraw stays applied.
    fn refresh(&mut self) {
        if let Err(err) = self.redraw() {
            tracing::warn!(error = %err, "redraw failed, keeping previous frame");
        }
    }

    fn redraw(&mut self) -> CaptionResult<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let fp = fingerprint_session(session);
        if self.frame.is_some() && self.rendered == Some(fp) {
            return Ok(());
        }
        let frame = session.render(&mut self.compositor, self.shaper.as_mut())?;
        self.frame = Some(frame);
        self.rendered = Some(fp);
        self.render_count += 1;
        Ok(())
    }

    /// Snapshot the current canvas for saving. The background must be loaded.
    pub fn export(&mut self) -> CaptionResult<ExportArtifact> {
        let Some(session) = self.session.as_ref() else {
            return Err(CaptionError::export("no open session"));
        };
        match session.image() {
            ImageState::Ready { .. } => {}
            ImageState::Failed { .. } => {
                return Err(CaptionError::export("background image failed to load"));
            }
            ImageState::Unloaded | ImageState::Loading { .. } => {
                return Err(CaptionError::export("background image is still loading"));
            }
        }
        self.redraw()?;
        let (Some(session), Some(frame)) = (self.session.as_ref(), self.frame.as_ref()) else {
            return Err(CaptionError::export("no frame rendered"));
        };
        ExportArtifact::new(frame, session.caption(), session.body())
    }

    /// Export and hand the artifact to `backend`. Success closes the session and keeps the
    /// backend's status; failure keeps the session open and records the error as status.
    #[tracing::instrument(skip(self, backend))]
    pub fn save(&mut self, backend: &mut dyn SaveBackend) -> CaptionResult<String> {
        let result = self.export().and_then(|artifact| backend.save(&artifact));
        match result {
            Ok(status) => {
                tracing::info!(%status, "caption image saved");
                self.close();
                self.status = Some(status.clone());
                Ok(status)
            }
            Err(err) => {
                tracing::warn!(error = %err, "save failed");
                self.status = Some(format!("Error: {err}"));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/controller.rs"]
mod tests;
