//! Theme colors and the fixed report palette.
//!
//! Every color a serializer paints comes from this module.
use serde::Serialize;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case hex without a leading `#`, e.g. `4400FF`.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Neutral light gray used for unknown themes and header fills.
pub const NEUTRAL: Color = Color::rgb(0xD3, 0xD3, 0xD3);
/// Organization header text.
pub const ORGANIZATION_TEXT: Color = Color::rgb(0x00, 0x20, 0x60);
/// Organization header background.
pub const ORGANIZATION_FILL: Color = NEUTRAL;
/// Detail block title background.
pub const DETAIL_TITLE_FILL: Color = NEUTRAL;
/// Text drawn on a theme-colored background.
pub const ON_THEME_TEXT: Color = Color::rgb(0xFF, 0xFF, 0xFF);

/// Known strategic themes, plus the fallback for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeStyle {
    KnowledgeAndInnovation,
    HealthAndQualityOfLife,
    SecurityAndCitizenship,
    SustainableDevelopment,
    GovernanceTransparencyParticipation,
    Default,
}

const KNOWN_THEMES: &[(&str, ThemeStyle)] = &[
    ("CONHECIMENTO E INOVAÇÃO", ThemeStyle::KnowledgeAndInnovation),
    ("SAÚDE E QUALIDADE DE VIDA", ThemeStyle::HealthAndQualityOfLife),
    ("SEGURANÇA E CIDADANIA", ThemeStyle::SecurityAndCitizenship),
    ("DESENVOLVIMENTO SUSTENTÁVEL", ThemeStyle::SustainableDevelopment),
    (
        "Gestão, Transparência e Participação",
        ThemeStyle::GovernanceTransparencyParticipation,
    ),
];

impl ThemeStyle {
    /// Resolve a theme name; exact match only, anything else is `Default`.
    pub fn resolve(theme: &str) -> Self {
        KNOWN_THEMES
            .iter()
            .find(|(name, _)| *name == theme)
            .map(|(_, style)| *style)
            .unwrap_or(ThemeStyle::Default)
    }

    pub fn color(self) -> Color {
        match self {
            ThemeStyle::KnowledgeAndInnovation => Color::rgb(0x44, 0x00, 0xFF),
            ThemeStyle::HealthAndQualityOfLife => Color::rgb(0xED, 0x28, 0x2C),
            ThemeStyle::SecurityAndCitizenship => Color::rgb(0xFF, 0xB0, 0x00),
            ThemeStyle::SustainableDevelopment => Color::rgb(0x87, 0xD2, 0x00),
            ThemeStyle::GovernanceTransparencyParticipation => Color::rgb(0x00, 0x20, 0x60),
            ThemeStyle::Default => NEUTRAL,
        }
    }
}

/// Header color for a theme name.
pub fn theme_color(theme: &str) -> Color {
    ThemeStyle::resolve(theme).color()
}
