//! Test presentation — records every call the engine makes.

use std::collections::HashSet;
use std::sync::Mutex;

use kamishibai_core::presentation::{Element, FadeTransition, Presentation};

/// One recorded presentation call.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationOp {
    Alert(String),
    Image(String),
    FadeOpacity(f32),
    FadeTransition(FadeTransition),
    FadeBackground(String),
    StartVisible(bool),
    Name(String),
    Text(String),
    Debug(String),
}

/// A presentation that binds a configurable set of element identifiers and
/// records every call in order.
#[derive(Debug)]
pub struct RecordingPresentation {
    bound: HashSet<String>,
    ops: Mutex<Vec<PresentationOp>>,
}

impl Default for RecordingPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPresentation {
    /// Every known element bound, debug panel included.
    #[must_use]
    pub fn new() -> Self {
        let ids = Element::REQUIRED
            .iter()
            .chain(std::iter::once(&Element::Debug))
            .flat_map(|e| e.ids().iter().copied());
        Self::with_ids(ids)
    }

    /// Only the given identifiers bound.
    #[must_use]
    pub fn with_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            bound: ids.into_iter().map(str::to_owned).collect(),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Everything bound except the given identifiers.
    #[must_use]
    pub fn without(ids: &[&str]) -> Self {
        let mut presentation = Self::new();
        for id in ids {
            presentation.bound.remove(*id);
        }
        presentation
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn ops(&self) -> Vec<PresentationOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Forgets every call recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Image sources set, in order.
    pub fn images(&self) -> Vec<String> {
        self.collect(|op| match op {
            PresentationOp::Image(src) => Some(src.clone()),
            _ => None,
        })
    }

    /// Alerts raised, in order.
    pub fn alerts(&self) -> Vec<String> {
        self.collect(|op| match op {
            PresentationOp::Alert(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Fade-layer opacities set, in order.
    pub fn fade_opacities(&self) -> Vec<f32> {
        self.collect(|op| match op {
            PresentationOp::FadeOpacity(opacity) => Some(*opacity),
            _ => None,
        })
    }

    /// The most recent text shown.
    pub fn last_text(&self) -> Option<String> {
        self.collect(|op| match op {
            PresentationOp::Text(text) => Some(text.clone()),
            _ => None,
        })
        .pop()
    }

    /// The most recent name shown.
    pub fn last_name(&self) -> Option<String> {
        self.collect(|op| match op {
            PresentationOp::Name(name) => Some(name.clone()),
            _ => None,
        })
        .pop()
    }

    /// The most recent diagnostics text.
    pub fn last_debug(&self) -> Option<String> {
        self.collect(|op| match op {
            PresentationOp::Debug(text) => Some(text.clone()),
            _ => None,
        })
        .pop()
    }

    fn collect<T>(&self, pick: impl Fn(&PresentationOp) -> Option<T>) -> Vec<T> {
        self.ops.lock().unwrap().iter().filter_map(pick).collect()
    }

    fn record(&self, op: PresentationOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Presentation for RecordingPresentation {
    fn has_element(&self, id: &str) -> bool {
        self.bound.contains(id)
    }

    fn alert(&self, message: &str) {
        self.record(PresentationOp::Alert(message.to_owned()));
    }

    fn set_image(&self, src: &str) {
        self.record(PresentationOp::Image(src.to_owned()));
    }

    fn set_fade_opacity(&self, opacity: f32) {
        self.record(PresentationOp::FadeOpacity(opacity));
    }

    fn set_fade_transition(&self, transition: FadeTransition) {
        self.record(PresentationOp::FadeTransition(transition));
    }

    fn set_fade_background(&self, color: &str) {
        self.record(PresentationOp::FadeBackground(color.to_owned()));
    }

    fn set_start_visible(&self, visible: bool) {
        self.record(PresentationOp::StartVisible(visible));
    }

    fn set_name(&self, name: &str) {
        self.record(PresentationOp::Name(name.to_owned()));
    }

    fn set_text(&self, text: &str) {
        self.record(PresentationOp::Text(text.to_owned()));
    }

    fn set_debug(&self, text: &str) {
        self.record(PresentationOp::Debug(text.to_owned()));
    }
}
