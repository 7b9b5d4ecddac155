//! Binding for the image gallery viewer. The viewer widget itself is an
//! external component; this module only carries its configuration, its
//! lifecycle hooks and the mode-dependent button toggling.

use std::sync::Arc;

use tracing::trace;

pub const GALLERY_SELECTOR: &str = ".docs-pictures";

const KNOWN_MODES: [&str; 3] = ["modal", "inline", "none"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOptions {
    /// Attribute holding the full-size image URL.
    pub url_attribute: String,
    pub inline: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            url_attribute: "data-original".to_string(),
            inline: false,
        }
    }
}

impl ViewerOptions {
    pub fn mode(&self) -> &'static str {
        if self.inline {
            "inline"
        } else {
            "modal"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    Ready,
    Show,
    Shown,
    Hide,
    Hidden,
    View,
    Viewed,
    Move,
    Moved,
    Rotate,
    Rotated,
    Scale,
    Scaled,
    Zoom,
    Zoomed,
    Play,
    Stop,
}

pub trait ViewerHooks: Send + Sync {
    fn ready(&self) {}
    fn show(&self) {}
    fn shown(&self) {}
    fn hide(&self) {}
    fn hidden(&self) {}
    fn view(&self) {}
    fn viewed(&self) {}
    fn moving(&self) {}
    fn moved(&self) {}
    fn rotate(&self) {}
    fn rotated(&self) {}
    fn scale(&self) {}
    fn scaled(&self) {}
    fn zoom(&self) {}
    fn zoomed(&self) {}
    fn play(&self) {}
    fn stop(&self) {}
}

pub struct NoopHooks;

impl ViewerHooks for NoopHooks {}

pub struct ViewerBinding {
    selector: String,
    options: ViewerOptions,
    hooks: Arc<dyn ViewerHooks>,
}

impl ViewerBinding {
    pub fn bind(
        selector: impl Into<String>,
        options: ViewerOptions,
        hooks: Arc<dyn ViewerHooks>,
    ) -> Self {
        Self {
            selector: selector.into(),
            options,
            hooks,
        }
    }

    /// The stock binding: gallery selector, default options, no-op hooks.
    pub fn gallery() -> Self {
        Self::bind(GALLERY_SELECTOR, ViewerOptions::default(), Arc::new(NoopHooks))
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Enables only the toolbar buttons that fit this binding's mode.
    pub fn apply_mode(&self, buttons: &mut [ViewerButton]) {
        toggle_buttons(buttons, self.options.mode());
    }

    pub fn dispatch(&self, event: ViewerEvent) {
        trace!(selector = %self.selector, ?event, "viewer: event");
        let hooks = self.hooks.as_ref();
        match event {
            ViewerEvent::Ready => hooks.ready(),
            ViewerEvent::Show => hooks.show(),
            ViewerEvent::Shown => hooks.shown(),
            ViewerEvent::Hide => hooks.hide(),
            ViewerEvent::Hidden => hooks.hidden(),
            ViewerEvent::View => hooks.view(),
            ViewerEvent::Viewed => hooks.viewed(),
            ViewerEvent::Move => hooks.moving(),
            ViewerEvent::Moved => hooks.moved(),
            ViewerEvent::Rotate => hooks.rotate(),
            ViewerEvent::Rotated => hooks.rotated(),
            ViewerEvent::Scale => hooks.scale(),
            ViewerEvent::Scaled => hooks.scaled(),
            ViewerEvent::Zoom => hooks.zoom(),
            ViewerEvent::Zoomed => hooks.zoomed(),
            ViewerEvent::Play => hooks.play(),
            ViewerEvent::Stop => hooks.stop(),
        }
    }
}

/// A toolbar button carrying a `data-enable` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerButton {
    pub name: String,
    pub enable: String,
    pub disabled: bool,
}

impl ViewerButton {
    pub fn new(name: impl Into<String>, enable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enable: enable.into(),
            disabled: false,
        }
    }
}

/// Disables every button whose `data-enable` does not mention `mode`.
/// Modes that do not mention one of the known modes leave buttons untouched.
pub fn toggle_buttons(buttons: &mut [ViewerButton], mode: &str) {
    if !KNOWN_MODES.iter().any(|known| mode.contains(known)) {
        return;
    }
    for button in buttons {
        button.disabled = !button.enable.contains(mode);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn toolbar() -> Vec<ViewerButton> {
        vec![
            ViewerButton::new("prev", "modal inline"),
            ViewerButton::new("fullscreen", "modal"),
            ViewerButton::new("destroy", "modal inline none"),
        ]
    }

    #[test]
    fn inline_mode_disables_modal_only_buttons() {
        let mut buttons = toolbar();
        toggle_buttons(&mut buttons, "inline");
        let disabled: Vec<_> = buttons.iter().map(|b| b.disabled).collect();
        assert_eq!(disabled, vec![false, true, false]);
    }

    #[test]
    fn switching_back_re_enables_buttons() {
        let mut buttons = toolbar();
        toggle_buttons(&mut buttons, "none");
        toggle_buttons(&mut buttons, "modal");
        assert!(buttons.iter().all(|b| !b.disabled));
    }

    #[test]
    fn unknown_mode_leaves_buttons_untouched() {
        let mut buttons = toolbar();
        buttons[1].disabled = true;
        toggle_buttons(&mut buttons, "fullscreen");
        let disabled: Vec<_> = buttons.iter().map(|b| b.disabled).collect();
        assert_eq!(disabled, vec![false, true, false]);
    }

    #[derive(Default)]
    struct CountingHooks {
        zooms: Mutex<u32>,
    }

    impl ViewerHooks for CountingHooks {
        fn zoomed(&self) {
            *self.zooms.lock().expect("lock") += 1;
        }
    }

    #[test]
    fn dispatch_reaches_only_the_matching_hook() {
        let hooks = Arc::new(CountingHooks::default());
        let binding = ViewerBinding::bind(GALLERY_SELECTOR, ViewerOptions::default(), hooks.clone());
        binding.dispatch(ViewerEvent::Zoom);
        binding.dispatch(ViewerEvent::Zoomed);
        binding.dispatch(ViewerEvent::Stop);
        assert_eq!(*hooks.zooms.lock().expect("lock"), 1);
    }

    #[test]
    fn gallery_binding_reads_original_image_attribute() {
        let binding = ViewerBinding::gallery();
        assert_eq!(binding.selector(), ".docs-pictures");
        assert_eq!(binding.options().url_attribute, "data-original");
        assert_eq!(binding.options().mode(), "modal");
        binding.dispatch(ViewerEvent::Ready);
    }

    #[test]
    fn inline_binding_disables_modal_only_buttons() {
        let options = ViewerOptions {
            inline: true,
            ..ViewerOptions::default()
        };
        let binding = ViewerBinding::bind(GALLERY_SELECTOR, options, Arc::new(NoopHooks));
        let mut buttons = toolbar();
        binding.apply_mode(&mut buttons);
        let disabled: Vec<_> = buttons.iter().map(|b| b.disabled).collect();
        assert_eq!(disabled, vec![false, true, false]);

        let mut buttons = toolbar();
        ViewerBinding::gallery().apply_mode(&mut buttons);
        assert!(buttons.iter().all(|b| !b.disabled));
    }
}
