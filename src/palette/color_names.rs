//! Approximate color naming for image prompts.

use super::Color;

/// Nearest-match distance must stay below this to produce a name.
pub const COLOR_NAME_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorGroup {
    Primary,
    Warm,
    Cool,
    Neutral,
}

#[derive(Debug, Clone, Copy)]
pub struct ColorName {
    pub color: Color,
    pub name: &'static str,
    pub group: ColorGroup,
}

const fn entry(value: u32, name: &'static str, group: ColorGroup) -> ColorName {
    ColorName {
        color: Color::from_u24(value),
        name,
        group,
    }
}

pub const REFERENCE_COLORS: &[ColorName] = &[
    entry(0xFF0000, "red", ColorGroup::Primary),
    entry(0x00FF00, "green", ColorGroup::Primary),
    entry(0x0000FF, "blue", ColorGroup::Primary),
    entry(0xFFFF00, "yellow", ColorGroup::Primary),
    entry(0xFF00FF, "magenta", ColorGroup::Primary),
    entry(0x00FFFF, "cyan", ColorGroup::Primary),
    entry(0xFFA500, "orange", ColorGroup::Warm),
    entry(0xFF6347, "coral", ColorGroup::Warm),
    entry(0xFF4500, "orange red", ColorGroup::Warm),
    entry(0xFFD700, "golden", ColorGroup::Warm),
    entry(0xFF69B4, "pink", ColorGroup::Warm),
    entry(0xFFC0CB, "light pink", ColorGroup::Warm),
    entry(0xA52A2A, "brown", ColorGroup::Warm),
    entry(0x8B4513, "saddle brown", ColorGroup::Warm),
    entry(0x800080, "purple", ColorGroup::Cool),
    entry(0x8A2BE2, "blue violet", ColorGroup::Cool),
    entry(0x4169E1, "royal blue", ColorGroup::Cool),
    entry(0x87CEEB, "sky blue", ColorGroup::Cool),
    entry(0xB0E0E6, "powder blue", ColorGroup::Cool),
    entry(0x20B2AA, "light sea green", ColorGroup::Cool),
    entry(0x32CD32, "lime green", ColorGroup::Cool),
    entry(0x98FB98, "pale green", ColorGroup::Cool),
    entry(0x000000, "black", ColorGroup::Neutral),
    entry(0xFFFFFF, "white", ColorGroup::Neutral),
    entry(0x808080, "gray", ColorGroup::Neutral),
    entry(0xC0C0C0, "silver", ColorGroup::Neutral),
    entry(0xF5F5DC, "beige", ColorGroup::Neutral),
    entry(0xF0E68C, "khaki", ColorGroup::Neutral),
    entry(0xDDA0DD, "plum", ColorGroup::Neutral),
    entry(0xF0F8FF, "alice blue", ColorGroup::Neutral),
];

/// Human-readable name for a color, if a reference entry is close enough.
///
/// Exact matches win; otherwise the nearest entry by RGB distance is used
/// when that distance is below [`COLOR_NAME_THRESHOLD`].
pub fn name_color(color: Color) -> Option<&'static str> {
    if let Some(exact) = REFERENCE_COLORS.iter().find(|entry| entry.color == color) {
        return Some(exact.name);
    }

    REFERENCE_COLORS
        .iter()
        .map(|entry| (entry.name, color.distance(&entry.color)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, distance)| *distance < COLOR_NAME_THRESHOLD)
        .map(|(name, _)| name)
}
