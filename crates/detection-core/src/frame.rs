//! Decoded frame buffers.

/// One decoded frame from the live stream: an RGBA pixel buffer with
/// known dimensions. Stride is always `width * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

impl FrameBuffer {
    /// Wrap raw RGBA bytes. Returns `None` when the byte length does not
    /// match the stated dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * BYTES_PER_PIXEL {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one solid RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the frame has any pixels at all. Sources can deliver
    /// zero-sized frames before the stream has negotiated dimensions.
    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame, yielding its raw bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Overwrite one pixel. Out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Read one pixel, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }
}
