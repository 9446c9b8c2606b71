//! Intensity categories and the symbols they are drawn with.

use wxradar_core::Palette;

/// Ordered precipitation intensity tiers.
///
/// `Hail` and `Tornado` have symbols and legend entries, but the threshold
/// ladder in [`Intensity::from_value`] tops out at `Severe`, so they are
/// never produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intensity {
    Clear,
    Light,
    Moderate,
    Heavy,
    VeryHeavy,
    Severe,
    Hail,
    Tornado,
}

impl Intensity {
    pub const ALL: [Intensity; 8] = [
        Intensity::Clear,
        Intensity::Light,
        Intensity::Moderate,
        Intensity::Heavy,
        Intensity::VeryHeavy,
        Intensity::Severe,
        Intensity::Hail,
        Intensity::Tornado,
    ];

    /// Map a scalar field value onto the threshold ladder.
    pub fn from_value(value: f64) -> Self {
        if value < 0.1 {
            Self::Clear
        } else if value < 0.5 {
            Self::Light
        } else if value < 1.0 {
            Self::Moderate
        } else if value < 2.5 {
            Self::Heavy
        } else if value < 5.0 {
            Self::VeryHeavy
        } else {
            Self::Severe
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::Heavy => "Heavy",
            Self::VeryHeavy => "Very Heavy",
            Self::Severe => "Severe",
            Self::Hail => "Hail",
            Self::Tornado => "Tornado",
        }
    }
}

const SQUARES: [&str; 8] = ["⬜", "🟦", "🟩", "🟨", "🟧", "🟥", "🟪", "⬛"];
const CIRCLES: [&str; 8] = ["⚪", "🔵", "🟢", "🟡", "🟠", "🔴", "🟣", "💢"];

/// One display symbol per [`Intensity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: [String; 8],
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::for_palette(Palette::Squares)
    }
}

impl SymbolTable {
    pub fn new(symbols: [String; 8]) -> Self {
        Self { symbols }
    }

    pub fn for_palette(palette: Palette) -> Self {
        let source = match palette {
            Palette::Squares => SQUARES,
            Palette::Circles => CIRCLES,
        };
        Self::new(source.map(str::to_string))
    }

    pub fn symbol(&self, intensity: Intensity) -> &str {
        &self.symbols[intensity.index()]
    }

    /// Legend split across two lines, four tiers each.
    pub fn legend_lines(&self) -> [String; 2] {
        let entry = |i: Intensity| format!("{} {}", self.symbol(i), i.label());
        let line = |tiers: &[Intensity]| tiers.iter().map(|&i| entry(i)).collect::<Vec<_>>().join("  ");
        [
            line(&Intensity::ALL[..4]),
            line(&Intensity::ALL[4..]),
        ]
    }
}
