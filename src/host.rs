//! Callbacks the simulation expects from whatever embeds it
//!
//! Output callbacks default to doing nothing so a host only implements what
//! it presents. Controls are polled once per integrated tick.

use crate::blocks::Bitmap;
use crate::settings::Settings;

pub trait Host {
    fn achievement_unlock(&mut self, _name: &str) {}
    fn skin_unlock(&mut self, _name: &str) {}
    fn bonus_level_unlock(&mut self, _name: &str) {}
    /// Speak or display a sign's text
    fn announce(&mut self, _text: &str) {}
    fn alert(&mut self, _text: &str, _image: Option<&Bitmap>) {}

    fn jump_pressed(&self) -> bool;
    fn left_pressed(&self) -> bool;
    fn right_pressed(&self) -> bool;
}

/// Control state for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub jump: bool,
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    pub fn poll(host: &dyn Host) -> Self {
        Self {
            jump: host.jump_pressed(),
            left: host.left_pressed(),
            right: host.right_pressed(),
        }
    }
}

/// Something a host was asked to present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Achievement(String),
    Skin(String),
    BonusLevel(String),
    Announce(String),
    Alert { text: String, with_image: bool },
}

/// Host without a screen: replays fixed controls and records every callback
#[derive(Debug, Clone)]
pub struct Headless {
    pub input: TickInput,
    pub events: Vec<HostEvent>,
    /// Record sign text; muted signs are only logged
    pub announce_signs: bool,
    /// Record alerts; muted alerts are only logged
    pub show_alerts: bool,
}

impl Default for Headless {
    fn default() -> Self {
        Self::new(TickInput::default())
    }
}

impl Headless {
    pub fn new(input: TickInput) -> Self {
        Self {
            input,
            events: Vec::new(),
            announce_signs: true,
            show_alerts: true,
        }
    }

    /// Presentation switches taken from the player's settings
    pub fn with_settings(input: TickInput, settings: &Settings) -> Self {
        Self {
            announce_signs: settings.announce_signs,
            show_alerts: settings.show_alerts,
            ..Self::new(input)
        }
    }

    fn record(&mut self, event: HostEvent) {
        log::info!("host event: {event:?}");
        self.events.push(event);
    }
}

impl Host for Headless {
    fn achievement_unlock(&mut self, name: &str) {
        self.record(HostEvent::Achievement(name.to_owned()));
    }

    fn skin_unlock(&mut self, name: &str) {
        self.record(HostEvent::Skin(name.to_owned()));
    }

    fn bonus_level_unlock(&mut self, name: &str) {
        self.record(HostEvent::BonusLevel(name.to_owned()));
    }

    fn announce(&mut self, text: &str) {
        if !self.announce_signs {
            log::debug!("muted sign: {text:?}");
            return;
        }
        self.record(HostEvent::Announce(text.to_owned()));
    }

    fn alert(&mut self, text: &str, image: Option<&Bitmap>) {
        if !self.show_alerts {
            log::debug!("muted alert: {text:?}");
            return;
        }
        self.record(HostEvent::Alert {
            text: text.to_owned(),
            with_image: image.is_some(),
        });
    }

    fn jump_pressed(&self) -> bool {
        self.input.jump
    }

    fn left_pressed(&self) -> bool {
        self.input.left
    }

    fn right_pressed(&self) -> bool {
        self.input.right
    }
}
