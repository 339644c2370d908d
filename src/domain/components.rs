//! A viewpoint's visualisation state refers to model elements by their IFC
//! GUID. Components without one cannot be written to a viewpoint document
//! and are skipped when it is built.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use uuid::Uuid;

/// A reference to one element of a BIM model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    /// The element's `IfcGuid`, e.g. `1Ryb8XgUj3gebyYvJGdU9n`.
    pub ifc_guid: Option<String>,
    /// Name of the system the element originates from.
    pub originating_system: Option<String>,
    /// Identifier of the element in the originating system.
    pub authoring_tool_id: Option<String>,
}

impl Component {
    /// A component identified by its IFC GUID.
    #[must_use]
    pub fn new(ifc_guid: impl Into<String>) -> Self {
        Self {
            ifc_guid: Some(ifc_guid.into()),
            ..Self::default()
        }
    }

    /// The IFC GUID, if present and non-empty.
    #[must_use]
    pub fn ifc_guid(&self) -> Option<&str> {
        self.ifc_guid.as_deref().filter(|guid| !guid.is_empty())
    }
}

/// Components to highlight when the viewpoint is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Group identifier.
    pub uuid: Uuid,
    /// The selected components.
    pub components: Vec<Component>,
}

/// Per-category visibility flags applied after `DefaultVisibility`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSetupHints {
    /// Whether spaces are visible.
    pub spaces_visible: bool,
    /// Whether space boundaries are visible.
    pub space_boundaries_visible: bool,
    /// Whether openings are visible.
    pub openings_visible: bool,
}

/// Which components are visible.
///
/// The exception list hides components when `default_visibility` is `true`,
/// and shows them when it is `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    /// Whether components are visible unless listed as exceptions.
    pub default_visibility: bool,
    /// Category flags.
    pub view_setup_hints: ViewSetupHints,
    /// The exceptions to `default_visibility`.
    pub components: Vec<Component>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            default_visibility: true,
            view_setup_hints: ViewSetupHints::default(),
            components: Vec::new(),
        }
    }
}

static COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("valid regex"));

/// An RGB or ARGB colour of 6 or 8 hexadecimal digits.
///
/// With 8 digits the first two are the alpha channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

/// The string is not 6 or 8 hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a 6 or 8 digit hexadecimal colour")]
pub struct InvalidColor(pub String);

impl Color {
    /// The colour as written to the `Color` attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The alpha channel, if the colour has one.
    #[must_use]
    pub fn alpha(&self) -> Option<u8> {
        (self.0.len() == 8)
            .then(|| u8::from_str_radix(&self.0[..2], 16).ok())
            .flatten()
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if COLOR_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidColor(s.to_string()))
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Components drawn in one colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    /// Group identifier.
    pub uuid: Uuid,
    /// The colour.
    pub color: Color,
    /// The coloured components.
    pub components: Vec<Component>,
}

/// The visualisation state belonging to one viewpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    /// Snapshot identifier.
    pub uuid: Uuid,
    /// Selection groups.
    pub selection: Vec<Selection>,
    /// Visibility.
    pub visibility: Visibility,
    /// Colouring groups.
    pub coloring: Vec<Coloring>,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            selection: Vec::new(),
            visibility: Visibility::default(),
            coloring: Vec::new(),
        }
    }
}
