use crate::{FrameFormat, PixelFormat, transcode::stride};

/// Size of the serialized header in bytes.
pub const BITMAP_INFO_HEADER_SIZE: usize = 40;

/// The `BITMAPINFOHEADER` a capture driver negotiates formats with.
///
/// A positive `height` means bottom-up rows, which is what capture drivers
/// deliver for RGB encodings.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitmapInfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}

impl BitmapInfoHeader {
    /// Describe `format` the way a driver expects to receive it.
    pub fn from_format(format: &FrameFormat) -> Self {
        let mut header = Self {
            size: BITMAP_INFO_HEADER_SIZE as u32,
            width: format.width() as i32,
            height: if format.is_top_down() {
                -(format.height() as i32)
            } else {
                format.height() as i32
            },
            planes: 1,
            bit_count: format.bits_per_pixel(),
            compression: format.pixel_format().compression(),
            ..Default::default()
        };
        header.size_image = header.calculate_image_size();
        header
    }

    /// Bytes of one full image: DWORD-aligned rows times the row count.
    pub fn calculate_image_size(&self) -> u32 {
        let rows = self.height.unsigned_abs() as usize;
        let row = stride(self.width.unsigned_abs(), self.bit_count);
        (row * rows).min(u32::MAX as usize) as u32
    }

    /// Parse a header from the start of a driver-owned descriptor.
    ///
    /// The descriptor may carry a palette or bit masks after the header; only
    /// the header is read. Returns `None` when the bytes are too short or the
    /// declared header size is smaller than a `BITMAPINFOHEADER`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < BITMAP_INFO_HEADER_SIZE {
            return None;
        }
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

        let header = Self {
            size: u32_at(0),
            width: u32_at(4) as i32,
            height: u32_at(8) as i32,
            planes: u16_at(12),
            bit_count: u16_at(14),
            compression: u32_at(16),
            size_image: u32_at(20),
            x_pels_per_meter: u32_at(24) as i32,
            y_pels_per_meter: u32_at(28) as i32,
            clr_used: u32_at(32),
            clr_important: u32_at(36),
        };
        if (header.size as usize) < BITMAP_INFO_HEADER_SIZE {
            return None;
        }
        Some(header)
    }

    pub fn to_bytes(&self) -> [u8; BITMAP_INFO_HEADER_SIZE] {
        let mut bytes = [0u8; BITMAP_INFO_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.compression.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.size_image.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.x_pels_per_meter.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.y_pels_per_meter.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.clr_used.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.clr_important.to_le_bytes());
        bytes
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_compression(self.compression, self.bit_count)
    }

    /// Combine the header with a negotiated frame rate.
    ///
    /// A negative height marks top-down rows. Compressed encodings may leave
    /// the bit count at 0, the encoding's usual depth is used then. Returns
    /// `None` if the header does not describe a usable image.
    pub fn to_frame_format(&self, frames_per_1000_second: u32) -> Option<FrameFormat> {
        if self.width <= 0 || self.height == 0 {
            return None;
        }
        let pixel_format = self.pixel_format()?;
        let bits_per_pixel = if self.bit_count == 0 && pixel_format.is_compressed() {
            pixel_format.default_bits_per_pixel()
        } else {
            self.bit_count
        };
        let format = FrameFormat::new(
            self.width as u32,
            self.height.unsigned_abs(),
            pixel_format,
            bits_per_pixel,
            frames_per_1000_second,
        )
        .ok()?;
        Some(format.with_top_down(self.height < 0))
    }
}
