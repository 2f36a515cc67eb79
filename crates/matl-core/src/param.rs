//! Material parameter identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of `CustomBoolean` slots.
pub const CUSTOM_BOOLEAN_COUNT: u8 = 20;
/// Number of `CustomFloat` slots.
pub const CUSTOM_FLOAT_COUNT: u8 = 20;
/// Number of `CustomVector` slots.
pub const CUSTOM_VECTOR_COUNT: u8 = 64;
/// Number of `Texture` slots. Every texture slot has a sampler slot with the same index.
pub const TEXTURE_COUNT: u8 = 20;
/// Number of rasterizer and blend state slots.
pub const STATE_COUNT: u8 = 1;

/// Identifier of a material parameter.
///
/// The set is closed: every identifier a material record can carry is one of
/// these variants, and the slot index is bounded by the per-kind count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamId {
    CustomBoolean(u8),
    CustomFloat(u8),
    CustomVector(u8),
    Texture(u8),
    Sampler(u8),
    RasterizerState(u8),
    BlendState(u8),
}

impl ParamId {
    /// All parameter kinds with their name prefix and slot count, in parse order.
    const KINDS: [(&'static str, u8, fn(u8) -> ParamId); 7] = [
        ("CustomBoolean", CUSTOM_BOOLEAN_COUNT, ParamId::CustomBoolean),
        ("CustomFloat", CUSTOM_FLOAT_COUNT, ParamId::CustomFloat),
        ("CustomVector", CUSTOM_VECTOR_COUNT, ParamId::CustomVector),
        ("Texture", TEXTURE_COUNT, ParamId::Texture),
        ("Sampler", TEXTURE_COUNT, ParamId::Sampler),
        ("RasterizerState", STATE_COUNT, ParamId::RasterizerState),
        ("BlendState", STATE_COUNT, ParamId::BlendState),
    ];

    /// Name prefix of this identifier's kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            ParamId::CustomBoolean(_) => "CustomBoolean",
            ParamId::CustomFloat(_) => "CustomFloat",
            ParamId::CustomVector(_) => "CustomVector",
            ParamId::Texture(_) => "Texture",
            ParamId::Sampler(_) => "Sampler",
            ParamId::RasterizerState(_) => "RasterizerState",
            ParamId::BlendState(_) => "BlendState",
        }
    }

    /// Slot index within the kind.
    pub fn index(&self) -> u8 {
        match *self {
            ParamId::CustomBoolean(i)
            | ParamId::CustomFloat(i)
            | ParamId::CustomVector(i)
            | ParamId::Texture(i)
            | ParamId::Sampler(i)
            | ParamId::RasterizerState(i)
            | ParamId::BlendState(i) => i,
        }
    }

    /// Sampler paired with a texture slot.
    ///
    /// Returns `None` for anything that is not a texture.
    pub fn sampler(&self) -> Option<ParamId> {
        match *self {
            ParamId::Texture(i) => Some(ParamId::Sampler(i)),
            _ => None,
        }
    }

    /// Check whether the slot index is within range for the kind
    pub fn is_valid(&self) -> bool {
        let count = match self {
            ParamId::CustomBoolean(_) => CUSTOM_BOOLEAN_COUNT,
            ParamId::CustomFloat(_) => CUSTOM_FLOAT_COUNT,
            ParamId::CustomVector(_) => CUSTOM_VECTOR_COUNT,
            ParamId::Texture(_) | ParamId::Sampler(_) => TEXTURE_COUNT,
            ParamId::RasterizerState(_) | ParamId::BlendState(_) => STATE_COUNT,
        };
        self.index() < count
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.index())
    }
}

/// Error returned when a string is not a known parameter identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown material parameter: {0}")]
pub struct ParseParamIdError(pub String);

impl FromStr for ParamId {
    type Err = ParseParamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for (prefix, count, make) in Self::KINDS {
            let Some(digits) = s.strip_prefix(prefix) else {
                continue;
            };

            // Reject signs, whitespace and leading zeros so names stay canonical
            let canonical = !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && (digits == "0" || !digits.starts_with('0'));
            if !canonical {
                break;
            }

            return match digits.parse::<u8>() {
                Ok(index) if index < count => Ok(make(index)),
                _ => Err(ParseParamIdError(s.to_string())),
            };
        }

        Err(ParseParamIdError(s.to_string()))
    }
}
