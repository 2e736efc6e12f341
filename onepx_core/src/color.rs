use std::fmt;
use std::str::FromStr;

/// Why a color argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("expected 6 hex digits, got {0}")]
    WrongLength(usize),

    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },

    /// Eight hex digits look like RRGGBBAA. Rejected rather than truncated.
    #[error("alpha channel is not supported, only RRGGBB")]
    AlphaNotSupported,
}

/// A solid 8-bit-per-channel RGB color.
///
/// Parsed from `RRGGBB`, `#RRGGBB` or `0xRRGGBB` with case-insensitive
/// hex digits. There is no alpha component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in scanline order: red, green, blue.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if let Some((position, digit)) = digits
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_hexdigit())
        {
            return Err(ParseColorError::InvalidDigit { digit, position });
        }

        // Every char is an ASCII hex digit from here on, so byte length
        // equals digit count and the pair slices below are well-formed.
        match digits.len() {
            6 => {}
            8 => return Err(ParseColorError::AlphaNotSupported),
            n => return Err(ParseColorError::WrongLength(n)),
        }

        let pair = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColorError::InvalidDigit {
                digit: digits[i..].chars().next().unwrap_or('?'),
                position: i,
            })
        };

        Ok(Self {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
