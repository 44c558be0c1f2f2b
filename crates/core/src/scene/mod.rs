use std::fmt;

use serde::{Deserialize, Serialize};

/// Vertical placement of the box or logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePosition {
    #[default]
    OffStage,
    OnStage,
}

/// The three text slots of the lower-third, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Label,
    Artist,
    Song,
}

impl TextField {
    pub const ALL: [TextField; 3] = [TextField::Label, TextField::Artist, TextField::Song];

    /// Position in reveal order.
    pub fn index(self) -> usize {
        match self {
            TextField::Label => 0,
            TextField::Artist => 1,
            TextField::Song => 2,
        }
    }

    pub fn next(self) -> Option<TextField> {
        match self {
            TextField::Label => Some(TextField::Artist),
            TextField::Artist => Some(TextField::Song),
            TextField::Song => None,
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextField::Label => "label",
            TextField::Artist => "artist",
            TextField::Song => "song",
        };
        f.write_str(name)
    }
}

/// Visible state of the overlay. Idle is [`OverlayScene::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayScene {
    pub box_position: StagePosition,
    pub box_width: f32,
    pub logo_position: StagePosition,
    /// Decorative rotate/scale flourish on the logo.
    pub logo_flourish: bool,
    pub logo_shimmer: bool,
    pub text_visible: bool,
    pub label: String,
    pub artist: String,
    pub song: String,
}

impl OverlayScene {
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Label => &self.label,
            TextField::Artist => &self.artist,
            TextField::Song => &self.song,
        }
    }

    /// True when nothing is on screen and every value is back at rest.
    pub fn is_at_rest(&self) -> bool {
        *self == Self::default()
    }

    /// True when any text would actually be seen by a viewer.
    pub fn shows_text(&self) -> bool {
        self.text_visible && TextField::ALL.iter().any(|f| !self.text(*f).is_empty())
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Label => &mut self.label,
            TextField::Artist => &mut self.artist,
            TextField::Song => &mut self.song,
        }
    }

    pub fn apply(&mut self, mutation: &VisualMutation) {
        match mutation {
            VisualMutation::BoxPosition(position) => self.box_position = *position,
            VisualMutation::BoxWidth(width) => self.box_width = width.max(0.0),
            VisualMutation::LogoPosition(position) => self.logo_position = *position,
            VisualMutation::LogoFlourish(on) => self.logo_flourish = *on,
            VisualMutation::LogoShimmer(on) => self.logo_shimmer = *on,
            VisualMutation::TextVisible(on) => self.text_visible = *on,
            VisualMutation::FieldText { field, text } => self.text_mut(*field).clone_from(text),
            VisualMutation::AppendChar { field, ch } => self.text_mut(*field).push(*ch),
        }
    }
}

/// A single change to the overlay's visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VisualMutation {
    BoxPosition(StagePosition),
    BoxWidth(f32),
    LogoPosition(StagePosition),
    LogoFlourish(bool),
    LogoShimmer(bool),
    TextVisible(bool),
    FieldText { field: TextField, text: String },
    /// Extends a field by one revealed character.
    AppendChar { field: TextField, ch: char },
}
