//! Frame capture
//!
//! Copies a color target into a CPU image. Rows in the staging buffer are
//! padded to wgpu's copy alignment and stripped again when building the image.

use image::RgbaImage;

use crate::context::RenderContext;

const BYTES_PER_PIXEL: u32 = 4;

/// Frame capture errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Cannot capture an empty {0}x{1} target")]
    EmptyTarget(u32, u32),
    #[error("Failed to map readback buffer: {0}")]
    Map(String),
    #[error("Readback returned {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
}

/// Bytes per row in the staging buffer for a target `width` pixels wide.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Remove row padding from mapped staging data.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32) -> Result<Vec<u8>, CaptureError> {
    let row = (width * BYTES_PER_PIXEL) as usize;
    let padded_row = padded_row as usize;
    let expected = padded_row * height as usize;
    if data.len() < expected {
        return Err(CaptureError::Size {
            expected,
            actual: data.len(),
        });
    }

    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    Ok(pixels)
}

/// Read an RGBA8 texture back into an image. Blocks until the copy completes.
pub fn read_texture(
    ctx: &RenderContext,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<RgbaImage, CaptureError> {
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptyTarget(width, height));
    }

    let padded_row = padded_bytes_per_row(width);
    let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Readback Buffer"),
        size: (padded_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue().submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    ctx.wait_idle();

    receiver
        .recv()
        .map_err(|e| CaptureError::Map(e.to_string()))?
        .map_err(|e| CaptureError::Map(e.to_string()))?;

    let pixels = {
        let data = slice.get_mapped_range();
        unpad_rows(&data, width, height, padded_row)?
    };
    buffer.unmap();

    RgbaImage::from_raw(width, height, pixels).ok_or(CaptureError::Size {
        expected: (width * height * BYTES_PER_PIXEL) as usize,
        actual: 0,
    })
}
