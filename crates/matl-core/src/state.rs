//! Raw sampler, rasterizer and blend values as stored in material records
//!
//! Each enum lists the values the viewer knows about. Anything else read from an
//! asset is kept verbatim in `Other` so it survives a load/save round trip and
//! can be reported when the value is translated to GPU state.

use serde::{Deserialize, Serialize};

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
            /// Value not known to the viewer
            Other(u32),
        }

        impl $name {
            /// All known values in declaration order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// Create from the raw value stored in the asset
            pub fn from_raw(value: u32) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Other(other),
                }
            }

            /// Raw value stored in the asset
            pub fn raw(&self) -> u32 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Other(value) => *value,
                }
            }

            /// Display name for editors
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Other(_) => "Unknown",
                }
            }
        }
    };
}

raw_enum! {
    /// Texture coordinate wrap mode
    MatlWrapMode {
        Repeat = 0 => "Repeat",
        ClampToEdge = 1 => "Clamp to Edge",
        MirroredRepeat = 2 => "Mirrored Repeat",
        ClampToBorder = 3 => "Clamp to Border",
    }
}

raw_enum! {
    /// Minification filter
    MatlMinFilter {
        Nearest = 0 => "Nearest",
        LinearMipmapLinear = 1 => "Linear Mipmap Linear",
        LinearMipmapLinear2 = 2 => "Linear Mipmap Linear2",
    }
}

raw_enum! {
    /// Magnification filter
    MatlMagFilter {
        Nearest = 0 => "Nearest",
        Linear = 1 => "Linear",
        Linear2 = 2 => "Linear + ???",
    }
}

raw_enum! {
    /// Texture filtering type; only `AnisotropicFiltering` enables anisotropy
    FilteringType {
        Default = 0 => "Default",
        Default2 = 1 => "Default2",
        AnisotropicFiltering = 2 => "Anisotropic Filtering",
    }
}

raw_enum! {
    /// Face culling mode
    MatlCullMode {
        Back = 0 => "Back",
        Front = 1 => "Front",
        None = 2 => "None",
    }
}

raw_enum! {
    /// Polygon fill mode
    MatlFillMode {
        Line = 0 => "Line",
        Solid = 1 => "Solid",
    }
}

raw_enum! {
    /// Color blend factor
    MatlBlendFactor {
        Zero = 0 => "Zero",
        One = 1 => "One",
        SourceAlpha = 2 => "Source Alpha",
        DestinationAlpha = 3 => "Destination Alpha",
        SourceColor = 4 => "Source Color",
        DestinationColor = 5 => "Destination Color",
        OneMinusSourceAlpha = 6 => "One Minus Source Alpha",
        OneMinusDestinationAlpha = 7 => "One Minus Destination Alpha",
        OneMinusSourceColor = 8 => "One Minus Source Color",
        OneMinusDestinationColor = 9 => "One Minus Destination Color",
        SourceAlphaSaturate = 10 => "Source Alpha Saturate",
    }
}
