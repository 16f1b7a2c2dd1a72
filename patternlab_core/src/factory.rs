//! The Factory Engine - Platform-Matched UI Families
//!
//! A [`Platform`] selects one [`UiFactory`], and that factory only ever
//! produces components of its own family. Adding a platform means adding a
//! variant together with its button, dialog and factory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait Button {
    fn render(&self) -> String;

    /// Message emitted when the button is pressed.
    fn on_click(&self) -> String;
}

pub trait Dialog {
    fn render(&self) -> String;
}

/// Rendered output of one factory call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedUi {
    pub button: String,
    pub dialog: String,
}

/// Produces a matched button/dialog pair.
pub trait UiFactory {
    fn platform(&self) -> Platform;

    fn create_button(&self) -> Box<dyn Button>;

    fn create_dialog(&self) -> Box<dyn Dialog>;

    fn render_ui(&self) -> RenderedUi {
        let button = self.create_button();
        let dialog = self.create_dialog();
        RenderedUi {
            button: button.render(),
            dialog: dialog.render(),
        }
    }
}

// ---- Web family ----

#[derive(Debug, Clone, Copy, Default)]
pub struct WebButton;

impl Button for WebButton {
    fn render(&self) -> String {
        r#"<button class="web-button">Click Me</button>"#.to_string()
    }

    fn on_click(&self) -> String {
        "Web button clicked".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebDialog;

impl Dialog for WebDialog {
    fn render(&self) -> String {
        r#"<div class="web-dialog">Web Dialog</div>"#.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebUiFactory;

impl UiFactory for WebUiFactory {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    fn create_button(&self) -> Box<dyn Button> {
        Box::new(WebButton)
    }

    fn create_dialog(&self) -> Box<dyn Dialog> {
        Box::new(WebDialog)
    }
}

// ---- Mobile family ----

#[derive(Debug, Clone, Copy, Default)]
pub struct MobileButton;

impl Button for MobileButton {
    fn render(&self) -> String {
        r#"<button class="mobile-button">Tap Me</button>"#.to_string()
    }

    fn on_click(&self) -> String {
        "Mobile button clicked".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MobileDialog;

impl Dialog for MobileDialog {
    fn render(&self) -> String {
        r#"<div class="mobile-dialog">Mobile Dialog</div>"#.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MobileUiFactory;

impl UiFactory for MobileUiFactory {
    fn platform(&self) -> Platform {
        Platform::Mobile
    }

    fn create_button(&self) -> Box<dyn Button> {
        Box::new(MobileButton)
    }

    fn create_dialog(&self) -> Box<dyn Dialog> {
        Box::new(MobileDialog)
    }
}

/// The factory variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Mobile,
}

impl Platform {
    pub fn all() -> [Platform; 2] {
        [Platform::Web, Platform::Mobile]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Mobile => "mobile",
        }
    }

    /// Returns the factory for this platform.
    pub fn factory(&self) -> Box<dyn UiFactory> {
        match self {
            Platform::Web => Box::new(WebUiFactory),
            Platform::Mobile => Box::new(MobileUiFactory),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "mobile" => Ok(Platform::Mobile),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
