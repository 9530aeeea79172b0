/// Signal state as written in an OCIT `Signalbild`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateSymbol {
    Green,
    Yellow,
    Red,
    RedYellow,
    Dark,
    YellowFlashing,
}

/// Signal state character of a SUMO `phase` state string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SumoState {
    /// `r`
    Red,
    /// `y`
    Yellow,
    /// `G`
    GreenMajor,
    /// `g`
    GreenMinor,
    /// `u`
    RedYellow,
    /// `o`
    OffBlinking,
    /// `O`
    Off,
}

/// OCIT state tokens and the symbol each stands for.
///
/// Besides the textual names, OCIT devices report the hex-coded states
/// `00`/`08` (dark, yellow blinking), `03` (red), `30` (green), `0F`
/// (red-yellow) and `0C` (yellow).
const SYMBOL_TABLE: &[(&str, StateSymbol)] = &[
    ("gruen", StateSymbol::Green),
    ("gelb", StateSymbol::Yellow),
    ("rot", StateSymbol::Red),
    ("rotgelb", StateSymbol::RedYellow),
    ("dunkel", StateSymbol::Dark),
    ("gelbblk", StateSymbol::YellowFlashing),
    ("00", StateSymbol::YellowFlashing),
    ("08", StateSymbol::YellowFlashing),
    ("03", StateSymbol::Red),
    ("30", StateSymbol::Green),
    ("0f", StateSymbol::RedYellow),
    ("0c", StateSymbol::Yellow),
];

impl StateSymbol {
    /// Look up an OCIT state token, ignoring ASCII case and surrounding whitespace
    #[must_use]
    pub fn from_ocit(token: &str) -> Option<Self> {
        let token = token.trim();
        SYMBOL_TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|&(_, symbol)| symbol)
    }

    #[must_use]
    pub const fn sumo_state(self) -> SumoState {
        match self {
            Self::Green => SumoState::GreenMajor,
            Self::Yellow => SumoState::Yellow,
            Self::Red => SumoState::Red,
            Self::RedYellow => SumoState::RedYellow,
            Self::Dark => SumoState::Off,
            Self::YellowFlashing => SumoState::OffBlinking,
        }
    }
}

impl SumoState {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Yellow => 'y',
            Self::GreenMajor => 'G',
            Self::GreenMinor => 'g',
            Self::RedYellow => 'u',
            Self::OffBlinking => 'o',
            Self::Off => 'O',
        }
    }

    /// Major green shown on a minor link becomes minor green; other states are unchanged
    #[must_use]
    pub const fn as_minor(self) -> Self {
        match self {
            Self::GreenMajor => Self::GreenMinor,
            other => other,
        }
    }
}
