//! Presentation surface abstraction.
//!
//! The engine never touches a concrete UI. It drives an implementation of
//! [`Presentation`], which may be a browser DOM, a native window, or the
//! headless stage used by the HTTP host.

use serde::{Deserialize, Serialize};

/// Elements the engine binds to, by their conventional identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    SceneImage,
    FadeLayer,
    StartControl,
    BackControl,
    AdvanceControl,
    Bgm,
    Rse,
    Se,
    Voice,
    NameBox,
    TextBox,
    Debug,
}

impl Element {
    /// Every element the engine must have before it will boot.
    pub const REQUIRED: [Element; 11] = [
        Element::SceneImage,
        Element::FadeLayer,
        Element::StartControl,
        Element::BackControl,
        Element::AdvanceControl,
        Element::Bgm,
        Element::Rse,
        Element::Se,
        Element::Voice,
        Element::NameBox,
        Element::TextBox,
    ];

    /// Identifiers accepted for this element, preferred first.
    #[must_use]
    pub fn ids(self) -> &'static [&'static str] {
        match self {
            Self::SceneImage => &["sceneImage"],
            Self::FadeLayer => &["fadeLayer"],
            Self::StartControl => &["startButton"],
            Self::BackControl => &["backButton", "prevButton"],
            Self::AdvanceControl => &["nextArea", "nextButton"],
            Self::Bgm => &["bgm"],
            Self::Rse => &["rse"],
            Self::Se => &["se"],
            Self::Voice => &["voice"],
            Self::NameBox => &["nameBox"],
            Self::TextBox => &["textBox"],
            Self::Debug => &["debug"],
        }
    }

    /// Label used when reporting the element as missing.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BackControl => "prevButton(or backButton)",
            Self::AdvanceControl => "nextButton(or nextArea)",
            other => other.ids()[0],
        }
    }
}

/// CSS-style transition applied to the fade layer's opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FadeTransition {
    /// Style cleared; the surface's stylesheet default applies.
    Inherit,
    /// Opacity changes apply instantly.
    Disabled,
    /// Opacity animates linearly over the given duration.
    Linear { millis: u64 },
}

/// A surface the engine renders to.
///
/// Every method is infallible from the engine's point of view; an
/// implementation that cannot honour a call should log and carry on.
pub trait Presentation: Send + Sync {
    /// Whether an element with this identifier is bound.
    fn has_element(&self, id: &str) -> bool;

    /// Shows a blocking, user-visible message. Used for fatal boot errors.
    fn alert(&self, message: &str);

    /// Replaces the displayed scene image.
    fn set_image(&self, src: &str);

    /// Sets the fade layer's opacity in `[0, 1]`.
    fn set_fade_opacity(&self, opacity: f32);

    /// Sets the fade layer's opacity transition.
    fn set_fade_transition(&self, transition: FadeTransition);

    /// Sets the fade layer's background colour.
    fn set_fade_background(&self, color: &str);

    /// Shows or hides the start control.
    fn set_start_visible(&self, visible: bool);

    /// Sets the speaker label.
    fn set_name(&self, name: &str);

    /// Sets the current page's text.
    fn set_text(&self, text: &str);

    /// Writes diagnostic text. Only called when `debug` is bound.
    fn set_debug(&self, text: &str);
}

/// Returns whether any of the element's identifiers is bound.
pub fn is_bound(presentation: &dyn Presentation, element: Element) -> bool {
    element.ids().iter().any(|id| presentation.has_element(id))
}

/// Lists the labels of required elements the surface does not bind.
pub fn missing_elements(presentation: &dyn Presentation) -> Vec<String> {
    Element::REQUIRED
        .iter()
        .filter(|element| !is_bound(presentation, **element))
        .map(|element| element.label().to_owned())
        .collect()
}
