//! Widget kinds appearing in layout sequences

use std::fmt;
use serde::{Serialize, Deserialize};

/// Closed set of UI widget categories
///
/// The discriminants are stable: they index rows and columns of the
/// affinity matrix and the per-kind histograms of [`TreeStats`](super::TreeStats).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WidgetKind {
    /// Structural container
    Layout = 0,
    /// Static text
    TextView = 1,
    /// Clickable text
    TextLink = 2,
    /// Text input
    EditText = 3,
    /// Static image
    ImageView = 4,
    /// Clickable image
    ImageLink = 5,
    /// Button
    Button = 6,
    /// Radio button
    RadioButton = 7,
    /// Toggle switch
    Switch = 8,
    /// Check box
    CheckBox = 9,
    /// Anything the classifier could not place
    Unclassified = 10,
    /// Repeating container whose children are list items
    List = 11,
    /// Toolbar / action bar
    Toolbar = 12,
}

impl WidgetKind {
    /// Number of widget kinds
    pub const COUNT: usize = 13;

    /// All kinds in discriminant order
    pub const ALL: [WidgetKind; WidgetKind::COUNT] = [
        WidgetKind::Layout,
        WidgetKind::TextView,
        WidgetKind::TextLink,
        WidgetKind::EditText,
        WidgetKind::ImageView,
        WidgetKind::ImageLink,
        WidgetKind::Button,
        WidgetKind::RadioButton,
        WidgetKind::Switch,
        WidgetKind::CheckBox,
        WidgetKind::Unclassified,
        WidgetKind::List,
        WidgetKind::Toolbar,
    ];

    /// Row/column index in affinity tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Token name used in layout sequences
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Layout => "Layout",
            WidgetKind::TextView => "TextView",
            WidgetKind::TextLink => "TextLink",
            WidgetKind::EditText => "EditText",
            WidgetKind::ImageView => "ImageView",
            WidgetKind::ImageLink => "ImageLink",
            WidgetKind::Button => "Button",
            WidgetKind::RadioButton => "RadioButton",
            WidgetKind::Switch => "Switch",
            WidgetKind::CheckBox => "CheckBox",
            WidgetKind::Unclassified => "Unclassified",
            WidgetKind::List => "List",
            WidgetKind::Toolbar => "Toolbar",
        }
    }

    /// Look up a kind by its exact token name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Structural nodes with no visual content of their own
    pub fn is_wrapper(self) -> bool {
        matches!(self, WidgetKind::Layout | WidgetKind::List)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
