//! Theme detection and diagram style palettes.

use quill_dom::Document;

/// Light/dark mode, read from the document root's class list at the moment
/// of drawing (never cached across draws).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub fn detect(doc: &Document) -> Self {
        if doc.has_class(doc.root(), "dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Styling for one flow-state class (`st=>start: Label|approved`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowStateStyle {
    pub fill: &'static str,
    pub font_color: Option<&'static str>,
    pub font_size: Option<u32>,
    pub bold: bool,
}

impl FlowStateStyle {
    const fn fill(fill: &'static str) -> Self {
        Self {
            fill,
            font_color: None,
            font_size: None,
            bold: false,
        }
    }
}

/// Flow-diagram drawing options. Derived from the theme at draw time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowchartOptions {
    pub line_width: u32,
    pub line_length: u32,
    pub text_margin: u32,
    pub font_size: u32,
    pub font_color: &'static str,
    pub line_color: &'static str,
    pub element_color: &'static str,
    pub fill: &'static str,
    pub yes_text: &'static str,
    pub no_text: &'static str,
    pub flowstates: Vec<(&'static str, FlowStateStyle)>,
}

impl FlowchartOptions {
    /// Palette for the given mode.
    #[must_use]
    pub fn for_mode(mode: ThemeMode) -> Self {
        let dark = mode.is_dark();
        let text_color = if dark { "#e0e0e0" } else { "#000000" };
        let fill_color = if dark { "#2a2a2a" } else { "#ffffff" };
        Self {
            line_width: 2,
            line_length: 50,
            text_margin: 10,
            font_size: 14,
            font_color: text_color,
            line_color: text_color,
            element_color: text_color,
            fill: fill_color,
            yes_text: "yes",
            no_text: "no",
            flowstates: vec![
                (
                    "past",
                    FlowStateStyle {
                        font_size: Some(12),
                        ..FlowStateStyle::fill(if dark { "#444444" } else { "#CCCCCC" })
                    },
                ),
                (
                    "current",
                    FlowStateStyle {
                        font_color: Some(if dark { "#ff6b6b" } else { "red" }),
                        bold: true,
                        ..FlowStateStyle::fill(if dark { "#4a4a00" } else { "yellow" })
                    },
                ),
                (
                    "future",
                    FlowStateStyle::fill(if dark { "#666600" } else { "#FFFF99" }),
                ),
                (
                    "request",
                    FlowStateStyle::fill(if dark { "#003366" } else { "blue" }),
                ),
                (
                    "invalid",
                    FlowStateStyle::fill(if dark { "#222222" } else { "#444444" }),
                ),
                (
                    "approved",
                    FlowStateStyle {
                        font_size: Some(12),
                        ..FlowStateStyle::fill("#58C4A3")
                    },
                ),
                (
                    "rejected",
                    FlowStateStyle {
                        font_size: Some(12),
                        ..FlowStateStyle::fill("#C45879")
                    },
                ),
            ],
        }
    }

    /// Style for a named flow-state class, if defined.
    #[must_use]
    pub fn flowstate(&self, name: &str) -> Option<&FlowStateStyle> {
        self.flowstates
            .iter()
            .find(|(state, _)| *state == name)
            .map(|(_, style)| style)
    }
}

/// Mermaid engine configuration, passed whole on (re)initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MermaidConfig {
    pub start_on_load: bool,
    pub security_level: &'static str,
    pub theme: &'static str,
    pub theme_variables: Option<MermaidThemeVariables>,
}

impl MermaidConfig {
    #[must_use]
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                start_on_load: false,
                security_level: "loose",
                theme: "default",
                theme_variables: None,
            },
            ThemeMode::Dark => Self {
                start_on_load: false,
                security_level: "loose",
                theme: "dark",
                theme_variables: Some(MermaidThemeVariables::dark()),
            },
        }
    }
}

/// Dark-mode color overrides matching the flow palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MermaidThemeVariables {
    pub primary_color: &'static str,
    pub primary_text_color: &'static str,
    pub primary_border_color: &'static str,
    pub line_color: &'static str,
    pub text_color: &'static str,
    pub main_bkg: &'static str,
    pub node_border: &'static str,
    pub cluster_bkg: &'static str,
}

impl MermaidThemeVariables {
    #[must_use]
    pub fn dark() -> Self {
        Self {
            primary_color: "#2a2a2a",
            primary_text_color: "#e0e0e0",
            primary_border_color: "#e0e0e0",
            line_color: "#e0e0e0",
            text_color: "#e0e0e0",
            main_bkg: "#2a2a2a",
            node_border: "#e0e0e0",
            cluster_bkg: "#333333",
        }
    }
}
