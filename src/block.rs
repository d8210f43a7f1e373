use crate::constants::{
    BLOCK_BODY_HEIGHT, BLOCK_TEXT_PADDING, CHAR_WIDTH, CONNECTOR_INSET, DROPDOWN_WIDTH,
    MIN_BLOCK_WIDTH, TEXT_FIELD_MIN_WIDTH, WIDGET_GAP,
};
use eframe::egui::{self, Pos2, Rect};
use uuid::Uuid;

/// Parameter widget a block kind exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Dropdown(&'static [&'static str]),
    TextField(&'static str),
    Both(&'static [&'static str], &'static str),
    None,
}

impl InputKind {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            InputKind::Dropdown(options) | InputKind::Both(options, _) => options,
            InputKind::TextField(_) | InputKind::None => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            InputKind::TextField(placeholder) | InputKind::Both(_, placeholder) => {
                Some(placeholder)
            }
            InputKind::Dropdown(_) | InputKind::None => None,
        }
    }

    /// Short hint shown in the toolbar under each block kind.
    pub fn hint(&self) -> &'static str {
        match self {
            InputKind::Dropdown(_) => "options",
            InputKind::TextField(_) => "input",
            InputKind::Both(_, _) => "options + input",
            InputKind::None => "no parameters",
        }
    }
}

/// A kind of block the user can create.
#[derive(Debug, PartialEq)]
pub struct BlockConfig {
    pub name: &'static str,
    pub input: InputKind,
    pub color: egui::Color32,
}

pub static BLOCK_CATALOG: [BlockConfig; 7] = [
    BlockConfig {
        name: "LED",
        input: InputKind::Dropdown(&["ON", "OFF"]),
        color: egui::Color32::from_rgb(220, 60, 60),
    },
    BlockConfig {
        name: "wait",
        input: InputKind::TextField("1"),
        color: egui::Color32::from_rgb(240, 150, 40),
    },
    BlockConfig {
        name: "servo to",
        input: InputKind::Both(&["0°", "90°", "180°"], "90"),
        color: egui::Color32::from_rgb(60, 110, 220),
    },
    BlockConfig {
        name: "motor",
        input: InputKind::Dropdown(&["▶", "◀", "⏹"]),
        color: egui::Color32::from_rgb(60, 170, 80),
    },
    BlockConfig {
        name: "if sensor >",
        input: InputKind::TextField("50"),
        color: egui::Color32::from_rgb(150, 80, 200),
    },
    BlockConfig {
        name: "display",
        input: InputKind::TextField("Hello"),
        color: egui::Color32::from_rgb(40, 180, 200),
    },
    BlockConfig {
        name: "play",
        input: InputKind::Both(&["🎵", "🚨", "🔔"], "440"),
        color: egui::Color32::from_rgb(220, 200, 40),
    },
];

/// Looks up a catalog entry by its display name.
pub fn config_by_name(name: &str) -> Option<&'static BlockConfig> {
    BLOCK_CATALOG.iter().find(|config| config.name == name)
}

/// Current parameter values of a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockData {
    pub selected: Option<String>,
    pub text: String,
}

/// Opaque payload carried by a block: what it is plus its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockContent {
    pub kind: &'static BlockConfig,
    pub data: BlockData,
}

impl BlockContent {
    pub fn new(kind: &'static BlockConfig) -> Self {
        Self {
            kind,
            data: BlockData::default(),
        }
    }

    pub fn with_data(kind: &'static BlockConfig, data: BlockData) -> Self {
        Self { kind, data }
    }

    /// Parameter summary, e.g. "90° 45" for a servo block.
    pub fn display_text(&self) -> String {
        let selected = || self.data.selected.as_deref().unwrap_or("Select");
        let text = || {
            if self.data.text.is_empty() {
                "___"
            } else {
                self.data.text.as_str()
            }
        };
        match self.kind.input {
            InputKind::Dropdown(_) => selected().to_string(),
            InputKind::TextField(_) => text().to_string(),
            InputKind::Both(_, _) => format!("{} {}", selected(), text()),
            InputKind::None => String::new(),
        }
    }

    /// Estimated on-screen width. Only the layout engine consumes this.
    pub fn width(&self) -> f32 {
        let label = text_width(self.kind.name);
        let text_field = |text: &str, placeholder: &str| {
            let shown = if text.is_empty() { placeholder } else { text };
            (text_width(shown) + BLOCK_TEXT_PADDING).max(TEXT_FIELD_MIN_WIDTH)
        };
        let widgets = match self.kind.input {
            InputKind::Dropdown(_) => WIDGET_GAP + DROPDOWN_WIDTH,
            InputKind::TextField(placeholder) => {
                WIDGET_GAP + text_field(&self.data.text, placeholder)
            }
            InputKind::Both(_, placeholder) => {
                WIDGET_GAP * 2.0 + DROPDOWN_WIDTH + text_field(&self.data.text, placeholder)
            }
            InputKind::None => 0.0,
        };
        (BLOCK_TEXT_PADDING * 2.0 + label + widgets).max(MIN_BLOCK_WIDTH)
    }
}

fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_WIDTH
}

pub struct Block {
    pub id: Uuid,
    pub position: Pos2,
    pub next: Option<Uuid>,
    pub content: BlockContent,
}

impl Block {
    pub fn new(position: Pos2, content: BlockContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            next: None,
            content,
        }
    }

    pub fn width(&self) -> f32 {
        self.content.width()
    }

    /// Body rectangle, centered on `position`.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, egui::vec2(self.width(), BLOCK_BODY_HEIGHT))
    }

    /// Point the top slot and bottom tab are centered on, horizontally.
    pub fn connector_x(&self) -> f32 {
        connector_x_at(self.position, self.width())
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..6].to_string()
    }
}

/// Connector x of a block of `width` centered at `position`.
pub fn connector_x_at(position: Pos2, width: f32) -> f32 {
    position.x - width / 2.0 + CONNECTOR_INSET
}
