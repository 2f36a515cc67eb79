//! Texture and sampler resource management.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::cache::BoundedCache;
use crate::context::RenderContext;
use crate::material::{SamplerData, TextureBinding};

/// Handle to a texture stored in the TextureManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// GPU texture data.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Live samplers kept for reuse. Edits that sweep a sampler setting create a
/// new sampler per value, so older ones are dropped past this count.
pub const MAX_CACHED_SAMPLERS: usize = 256;

/// Hashable form of [`SamplerData`] for the sampler cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SamplerKey {
    address_modes: [wgpu::AddressMode; 3],
    filters: [wgpu::FilterMode; 3],
    lod_bias: u32,
    max_anisotropy: u16,
    border_color: Option<wgpu::SamplerBorderColor>,
}

impl SamplerKey {
    fn new(data: &SamplerData) -> Self {
        let descriptor = data.descriptor();
        Self {
            address_modes: [
                descriptor.address_mode_u,
                descriptor.address_mode_v,
                descriptor.address_mode_w,
            ],
            filters: [
                descriptor.mag_filter,
                descriptor.min_filter,
                descriptor.mipmap_filter,
            ],
            lod_bias: data.lod_bias.to_bits(),
            max_anisotropy: descriptor.anisotropy_clamp,
            border_color: descriptor.border_color,
        }
    }
}

/// Manager for textures and the samplers material slots ask for.
///
/// Samplers are cached by their settings; materials with identical sampler
/// records share one wgpu sampler. Bind groups keep their own reference, so an
/// evicted sampler stays valid for the materials still using it.
pub struct TextureManager {
    textures: HashMap<TextureHandle, GpuTexture>,
    samplers: BoundedCache<SamplerKey, wgpu::Sampler>,
    default_texture: Option<TextureHandle>,
    next_handle: AtomicU64,
}

impl TextureManager {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            samplers: BoundedCache::new(MAX_CACHED_SAMPLERS),
            default_texture: None,
            next_handle: AtomicU64::new(1),
        }
    }

    /// Upload RGBA8 pixel data and return a handle.
    pub fn create_rgba8(
        &mut self,
        ctx: &RenderContext,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> TextureHandle {
        let handle = TextureHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = ctx.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let expected = (size.width * size.height * 4) as usize;
        if pixels.len() >= expected {
            ctx.queue().write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &pixels[..expected],
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size.width),
                    rows_per_image: Some(size.height),
                },
                size,
            );
        } else {
            tracing::warn!(
                "Texture '{}' has {} bytes, expected {}; leaving it blank",
                label,
                pixels.len(),
                expected
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.insert(
            handle,
            GpuTexture {
                texture,
                view,
                width: size.width,
                height: size.height,
            },
        );
        handle
    }

    /// Create the 1x1 white texture bound to unresolved texture slots.
    pub fn ensure_default(&mut self, ctx: &RenderContext) -> TextureHandle {
        if let Some(handle) = self.default_texture {
            if self.textures.contains_key(&handle) {
                return handle;
            }
        }
        let handle = self.create_rgba8(ctx, "Default Texture", 1, 1, &[255, 255, 255, 255]);
        self.default_texture = Some(handle);
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(&handle)
    }

    /// View for a material texture slot, falling back to the default texture.
    pub fn view_or_default(&self, binding: &TextureBinding) -> Option<&wgpu::TextureView> {
        binding
            .handle
            .and_then(|h| self.textures.get(&h))
            .or_else(|| self.default_texture.and_then(|h| self.textures.get(&h)))
            .map(|t| &t.view)
    }

    /// Cached sampler for the given settings.
    ///
    /// Clamp-to-border needs a device feature; without it the border axes fall
    /// back to clamp-to-edge.
    pub fn sampler(&mut self, ctx: &RenderContext, data: &SamplerData) -> &wgpu::Sampler {
        let mut data = *data;
        if data.uses_border()
            && !ctx
                .device()
                .features()
                .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER)
        {
            tracing::debug!("Clamp to border unsupported, using clamp to edge");
            for mode in [
                &mut data.address_mode_u,
                &mut data.address_mode_v,
                &mut data.address_mode_w,
            ] {
                if *mode == wgpu::AddressMode::ClampToBorder {
                    *mode = wgpu::AddressMode::ClampToEdge;
                }
            }
        }

        let key = SamplerKey::new(&data);
        self.samplers
            .get_or_insert_with(key, || ctx.device().create_sampler(&data.descriptor()))
    }

    pub fn remove(&mut self, handle: TextureHandle) -> Option<GpuTexture> {
        self.textures.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    /// Release every texture and sampler, including the default texture.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.samplers.clear();
        self.default_texture = None;
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}
