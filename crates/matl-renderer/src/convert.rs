//! Translation of material record values to GPU state
//!
//! Only values the viewer knows how to express are translated. Anything else,
//! including every `Other` raw value, is reported as a [`GpuStateError`] so the
//! caller can keep the rest of the material usable.

use matl_core::{
    MatlBlendFactor, MatlCullMode, MatlFillMode, MatlMagFilter, MatlMinFilter, MatlWrapMode,
};

/// A material value with no GPU equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GpuStateError {
    #[error("Unsupported wrap mode: {0}")]
    WrapMode(u32),
    #[error("Unsupported min filter: {0}")]
    MinFilter(u32),
    #[error("Unsupported mag filter: {0}")]
    MagFilter(u32),
    #[error("Unsupported cull mode: {0}")]
    CullMode(u32),
    #[error("Unsupported fill mode: {0}")]
    FillMode(u32),
    #[error("Unsupported blend factor: {0}")]
    BlendFactor(u32),
}

/// Conversion from a raw material value to its wgpu counterpart
pub trait ToWgpu {
    type Output;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError>;
}

impl ToWgpu for MatlWrapMode {
    type Output = wgpu::AddressMode;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        match self {
            MatlWrapMode::Repeat => Ok(wgpu::AddressMode::Repeat),
            MatlWrapMode::ClampToEdge => Ok(wgpu::AddressMode::ClampToEdge),
            MatlWrapMode::MirroredRepeat => Ok(wgpu::AddressMode::MirrorRepeat),
            MatlWrapMode::ClampToBorder => Ok(wgpu::AddressMode::ClampToBorder),
            MatlWrapMode::Other(raw) => Err(GpuStateError::WrapMode(*raw)),
        }
    }
}

impl ToWgpu for MatlMagFilter {
    type Output = wgpu::FilterMode;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        match self {
            MatlMagFilter::Nearest => Ok(wgpu::FilterMode::Nearest),
            MatlMagFilter::Linear | MatlMagFilter::Linear2 => Ok(wgpu::FilterMode::Linear),
            MatlMagFilter::Other(raw) => Err(GpuStateError::MagFilter(*raw)),
        }
    }
}

/// Min filter translates to a (minification, mipmap) filter pair.
impl ToWgpu for MatlMinFilter {
    type Output = (wgpu::FilterMode, wgpu::FilterMode);

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        match self {
            MatlMinFilter::Nearest => Ok((wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest)),
            MatlMinFilter::LinearMipmapLinear | MatlMinFilter::LinearMipmapLinear2 => {
                Ok((wgpu::FilterMode::Linear, wgpu::FilterMode::Linear))
            }
            MatlMinFilter::Other(raw) => Err(GpuStateError::MinFilter(*raw)),
        }
    }
}

/// `None` disables culling.
impl ToWgpu for MatlCullMode {
    type Output = Option<wgpu::Face>;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        match self {
            MatlCullMode::Back => Ok(Some(wgpu::Face::Back)),
            MatlCullMode::Front => Ok(Some(wgpu::Face::Front)),
            MatlCullMode::None => Ok(None),
            MatlCullMode::Other(raw) => Err(GpuStateError::CullMode(*raw)),
        }
    }
}

impl ToWgpu for MatlFillMode {
    type Output = wgpu::PolygonMode;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        match self {
            MatlFillMode::Solid => Ok(wgpu::PolygonMode::Fill),
            MatlFillMode::Line => Ok(wgpu::PolygonMode::Line),
            MatlFillMode::Other(raw) => Err(GpuStateError::FillMode(*raw)),
        }
    }
}

impl ToWgpu for MatlBlendFactor {
    type Output = wgpu::BlendFactor;

    fn to_wgpu(&self) -> Result<Self::Output, GpuStateError> {
        use wgpu::BlendFactor as B;
        match self {
            MatlBlendFactor::Zero => Ok(B::Zero),
            MatlBlendFactor::One => Ok(B::One),
            MatlBlendFactor::SourceAlpha => Ok(B::SrcAlpha),
            MatlBlendFactor::DestinationAlpha => Ok(B::DstAlpha),
            MatlBlendFactor::SourceColor => Ok(B::Src),
            MatlBlendFactor::DestinationColor => Ok(B::Dst),
            MatlBlendFactor::OneMinusSourceAlpha => Ok(B::OneMinusSrcAlpha),
            MatlBlendFactor::OneMinusDestinationAlpha => Ok(B::OneMinusDstAlpha),
            MatlBlendFactor::OneMinusSourceColor => Ok(B::OneMinusSrc),
            MatlBlendFactor::OneMinusDestinationColor => Ok(B::OneMinusDst),
            MatlBlendFactor::SourceAlphaSaturate => Ok(B::SrcAlphaSaturated),
            MatlBlendFactor::Other(raw) => Err(GpuStateError::BlendFactor(*raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_modes() {
        assert_eq!(MatlWrapMode::Repeat.to_wgpu(), Ok(wgpu::AddressMode::Repeat));
        assert_eq!(
            MatlWrapMode::MirroredRepeat.to_wgpu(),
            Ok(wgpu::AddressMode::MirrorRepeat)
        );
        assert_eq!(
            MatlWrapMode::ClampToBorder.to_wgpu(),
            Ok(wgpu::AddressMode::ClampToBorder)
        );
        assert_eq!(
            MatlWrapMode::Other(7).to_wgpu(),
            Err(GpuStateError::WrapMode(7))
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(MatlMagFilter::Linear2.to_wgpu(), Ok(wgpu::FilterMode::Linear));
        assert_eq!(
            MatlMinFilter::LinearMipmapLinear2.to_wgpu(),
            Ok((wgpu::FilterMode::Linear, wgpu::FilterMode::Linear))
        );
        assert_eq!(
            MatlMinFilter::Nearest.to_wgpu(),
            Ok((wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest))
        );
        assert!(MatlMinFilter::Other(5).to_wgpu().is_err());
    }

    #[test]
    fn test_cull_and_fill() {
        assert_eq!(MatlCullMode::Front.to_wgpu(), Ok(Some(wgpu::Face::Front)));
        assert_eq!(MatlCullMode::None.to_wgpu(), Ok(None));
        assert_eq!(MatlFillMode::Line.to_wgpu(), Ok(wgpu::PolygonMode::Line));
        assert_eq!(
            MatlFillMode::Other(3).to_wgpu(),
            Err(GpuStateError::FillMode(3))
        );
    }

    #[test]
    fn test_every_known_blend_factor_translates() {
        for factor in MatlBlendFactor::KNOWN {
            assert!(factor.to_wgpu().is_ok(), "{:?}", factor);
        }
        assert_eq!(
            MatlBlendFactor::Other(11).to_wgpu(),
            Err(GpuStateError::BlendFactor(11))
        );
    }
}
