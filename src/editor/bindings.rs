//! Per-session event bindings, revocable as one unit.
//!
//! Every control a session listens to holds a [`Subscription`] sharing the session's
//! [`RevocationToken`]. Disposing the [`SessionHandle`] flips the token, so any subscription
//! or load ticket still held elsewhere goes inert at the same moment.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::editor::session::SessionId;

/// Every input the editor can bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Control {
    GradientColor,
    GradientOpacity,
    FontSize,
    LineHeight,
    Align,
    Weight,
    Slant,
    TextColor,
    ShadowBlur,
    Caption,
    Pointer,
    ImageLoad,
}

impl Control {
    pub const ALL: [Control; 12] = [
        Control::GradientColor,
        Control::GradientOpacity,
        Control::FontSize,
        Control::LineHeight,
        Control::Align,
        Control::Weight,
        Control::Slant,
        Control::TextColor,
        Control::ShadowBlur,
        Control::Caption,
        Control::Pointer,
        Control::ImageLoad,
    ];
}

/// Shared one-way switch; once revoked it stays revoked.
#[derive(Clone, Debug, Default)]
pub struct RevocationToken(Rc<Cell<bool>>);

impl RevocationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self) {
        self.0.set(true);
    }

    pub fn is_revoked(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Debug)]
pub struct Subscription {
    control: Control,
    token: RevocationToken,
}

impl Subscription {
    pub fn control(&self) -> Control {
        self.control
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_revoked()
    }
}

#[derive(Debug)]
pub struct SessionHandle {
    session: SessionId,
    token: RevocationToken,
    subscriptions: BTreeMap<Control, Subscription>,
}

impl SessionHandle {
    pub(crate) fn new(session: SessionId) -> Self {
        Self {
            session,
            token: RevocationToken::new(),
            subscriptions: BTreeMap::new(),
        }
    }

    /// Handle with every [`Control`] bound.
    pub(crate) fn bind_all(session: SessionId) -> Self {
        let mut handle = Self::new(session);
        for control in Control::ALL {
            handle.subscribe(control);
        }
        handle
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Bind `control`. Binding on a disposed handle yields an inert subscription.
    pub fn subscribe(&mut self, control: Control) -> Subscription {
        let sub = Subscription {
            control,
            token: self.token.clone(),
        };
        if !self.is_disposed() {
            self.subscriptions.insert(control, sub.clone());
        }
        sub
    }

    pub fn unsubscribe(&mut self, control: Control) -> bool {
        self.subscriptions.remove(&control).is_some()
    }

    pub fn accepts(&self, control: Control) -> bool {
        self.subscriptions
            .get(&control)
            .is_some_and(Subscription::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.subscriptions
            .values()
            .filter(|s| s.is_active())
            .count()
    }

    /// Token observed by everything handed out for this session.
    pub fn token(&self) -> RevocationToken {
        self.token.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_revoked()
    }

    /// Revoke every binding of the session at once.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.token.revoke();
        let released = self.subscriptions.len();
        self.subscriptions.clear();
        tracing::debug!(session = self.session.0, released, "session bindings revoked");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/bindings.rs"]
mod tests;
