//! UI chrome state: hamburger panel, color theme and the sign-in email form.
//!
//! Each piece is a small state type whose transitions are plain methods.
//! The visual consequence (CSS classes, custom properties, messages) is
//! derived from the state by a separate accessor, and the page script only
//! applies what it is given.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Hamburger panel
// ============================================================================

/// Open/closed state of the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    Open,
    #[default]
    Closed,
}

/// One CSS class whose membership follows the panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassToggle {
    pub selector: &'static str,
    pub class: &'static str,
    pub present: bool,
}

impl PanelState {
    /// Flip the state and return the new one.
    pub fn toggle(&mut self) -> Self {
        *self = match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        };
        *self
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Class membership applied in lockstep to the menu elements.
    #[must_use]
    pub fn classes(self) -> [ClassToggle; 3] {
        let present = self.is_open();
        [
            ClassToggle {
                selector: ".js-hamburger-menu",
                class: "change",
                present,
            },
            ClassToggle {
                selector: ".js-properties",
                class: "c-sidebar__properties--force-show",
                present,
            },
            ClassToggle {
                selector: ".logo",
                class: "light-color",
                present,
            },
        ]
    }
}

// ============================================================================
// Theme
// ============================================================================

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// CSS custom properties written on the document root.
    #[must_use]
    pub fn custom_properties(self) -> [(&'static str, &'static str); 5] {
        match self {
            Self::Light => [
                ("--global-html-color", "#1d1d1b"),
                ("--global-html-backgroundColor", "#ffffff"),
                ("--popup-iconColor", "#1d1d1b"),
                ("--popup-detailsTextColor", "#6b6b6b"),
                ("--global-leaflet-wekit-filter", "none"),
            ],
            Self::Dark => [
                ("--global-html-color", "#f5f5f5"),
                ("--global-html-backgroundColor", "#1d1d1b"),
                ("--popup-iconColor", "#f5f5f5"),
                ("--popup-detailsTextColor", "#b3b3b3"),
                (
                    "--global-leaflet-wekit-filter",
                    "invert(100%) hue-rotate(180deg) brightness(95%) contrast(90%)",
                ),
            ],
        }
    }
}

/// OS color-scheme preference plus an optional manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ThemeState {
    pub os_preference: Theme,
    pub manual_override: Option<Theme>,
}

impl ThemeState {
    /// Theme in effect: the override if set, else the OS preference.
    #[must_use]
    pub fn effective(self) -> Theme {
        self.manual_override.unwrap_or(self.os_preference)
    }

    /// Record an OS color-scheme change.
    pub fn set_os_preference(&mut self, theme: Theme) {
        self.os_preference = theme;
    }

    /// Set or clear the manual override.
    pub fn set_override(&mut self, theme: Option<Theme>) {
        self.manual_override = theme;
    }
}

// ============================================================================
// Email form
// ============================================================================

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_MESSAGE: &str = "Invalid email address";
const SUBMIT_LABEL: &str = "Submit";
const SUCCESS_LABEL: &str = "Thanks! Check your mailbox and spam";

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Outcome of checking an email field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailCheck {
    Valid,
    Required,
    Invalid,
}

impl EmailCheck {
    /// Inline error message, if any.
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Required => Some(REQUIRED_MESSAGE),
            Self::Invalid => Some(INVALID_MESSAGE),
        }
    }
}

#[must_use]
pub fn check_email(value: &str) -> EmailCheck {
    if value.is_empty() {
        EmailCheck::Required
    } else if is_valid_email(value) {
        EmailCheck::Valid
    } else {
        EmailCheck::Invalid
    }
}

/// State of the sign-in button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    Idle,
    Success,
    Failed,
}

impl SubmitState {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => SUBMIT_LABEL,
            Self::Success => SUCCESS_LABEL,
            Self::Failed => INVALID_MESSAGE,
        }
    }

    /// Modifier class on `.js-sign-in-button`.
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Success => Some("c-lead-capture__submit--success"),
            Self::Failed => Some("c-lead-capture__submit--failed"),
        }
    }
}

/// DOM event on the email field or its submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailEvent {
    Input,
    Blur,
    Focus,
    Submit,
}

impl std::str::FromStr for EmailEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "blur" => Ok(Self::Blur),
            "focus" => Ok(Self::Focus),
            "submit" => Ok(Self::Submit),
            _ => Err(format!("unknown email event: {s}")),
        }
    }
}

/// Sign-in email field with its error display and input re-validation.
///
/// Re-validation on every input is only armed after a blur found a
/// problem, and disarms as soon as the value is valid or emptied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailField {
    value: String,
    error: Option<EmailCheck>,
    revalidate_on_input: bool,
    submit: SubmitState,
}

impl EmailField {
    /// Apply a DOM event; `value` is the field's current content.
    pub fn handle(&mut self, event: EmailEvent, value: &str) {
        match event {
            EmailEvent::Input => self.on_input(value),
            EmailEvent::Blur => {
                value.clone_into(&mut self.value);
                self.on_blur();
            }
            EmailEvent::Focus => self.on_focus(),
            EmailEvent::Submit => {
                value.clone_into(&mut self.value);
                self.on_submit();
            }
        }
    }

    pub fn on_blur(&mut self) {
        match check_email(&self.value) {
            EmailCheck::Valid => {}
            problem => {
                self.error = Some(problem);
                self.revalidate_on_input = true;
            }
        }
    }

    pub fn on_input(&mut self, value: &str) {
        value.clone_into(&mut self.value);
        if !self.revalidate_on_input {
            return;
        }
        match check_email(&self.value) {
            EmailCheck::Valid | EmailCheck::Required => {
                self.error = None;
                self.revalidate_on_input = false;
            }
            EmailCheck::Invalid => self.error = Some(EmailCheck::Invalid),
        }
    }

    pub fn on_focus(&mut self) {
        self.submit = SubmitState::Idle;
    }

    /// Validate locally and update the button. Nothing is sent anywhere.
    pub fn on_submit(&mut self) -> SubmitState {
        self.submit = if is_valid_email(&self.value) {
            SubmitState::Success
        } else {
            SubmitState::Failed
        };
        self.submit
    }

    /// Error message shown under the field.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.and_then(EmailCheck::message)
    }

    #[must_use]
    pub fn is_revalidating(&self) -> bool {
        self.revalidate_on_input
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.submit
    }
}
