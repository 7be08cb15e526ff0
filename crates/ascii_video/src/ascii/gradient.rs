use std::fmt;

use serde::Deserialize;

use crate::Error;

/// Sum of the three color channels at full brightness.
const MAX_CHANNEL_SUM: usize = 3 * 255;

/// Ordered glyph ramp, darkest glyph first.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Gradient {
    chars: Vec<char>,
}

impl Gradient {
    pub const DEFAULT_RAMP: &'static str = " .-:=+*#%@";

    pub fn new(chars: impl Into<String>) -> Self {
        let chars: Vec<char> = chars.into().chars().collect();
        assert!(chars.len() >= 2, "gradient must contain at least two characters");
        Self { chars }
    }

    /// Fallible constructor for ramps coming from user input.
    pub fn parse(chars: &str) -> Result<Self, Error> {
        let count = chars.chars().count();
        if count < 2 {
            return Err(Error::InvalidGradient(count));
        }

        Ok(Self::new(chars))
    }

    /// The 10 level ramp used by default.
    pub fn ramp() -> Self {
        Self::new(Self::DEFAULT_RAMP)
    }

    pub fn detailed() -> Self {
        Self::new(" .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$")
    }

    pub fn blocks() -> Self {
        Self::new(" ░▒▓█")
    }

    pub fn binary() -> Self {
        Self::new(" #")
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Glyph index for an RGB pixel, using the unweighted channel mean as luminance.
    ///
    /// `floor((r + g + b) / 3 / 255 * (len - 1))` is computed exactly as
    /// `(r + g + b) * (len - 1) / 765`.
    #[inline]
    pub fn index_of_rgb(&self, r: u8, g: u8, b: u8) -> usize {
        let sum = usize::from(r) + usize::from(g) + usize::from(b);
        sum * (self.chars.len() - 1) / MAX_CHANNEL_SUM
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::ramp()
    }
}

impl TryFrom<String> for Gradient {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|ch| write!(f, "{ch}"))
    }
}
