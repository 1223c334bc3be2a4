use crate::ImageError;
use std::fmt;

// DIB compression codes
pub const BI_RGB: u32 = 0;
pub const BI_BITFIELDS: u32 = 3;
pub const BI_JPEG: u32 = 4;
pub const BI_PNG: u32 = 5;

// fourcc codes used as DIB compression values
pub const FOURCC_YUY2: u32 = u32::from_le_bytes(*b"YUY2");
pub const FOURCC_YUYV: u32 = u32::from_le_bytes(*b"YUYV");
pub const FOURCC_UYVY: u32 = u32::from_le_bytes(*b"UYVY");
pub const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");

/// Render a compression code: the 4 characters of a fourcc, or hex for
/// numeric DIB codes such as `BI_RGB`.
pub fn fourcc_to_string(fourcc: u32) -> String {
    let bytes = fourcc.to_le_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("{fourcc:#010x}")
    }
}

/// Pixel encodings a capture driver can negotiate.
///
/// RGB-family bytes are stored in DIB order: blue first, rows bottom-up as
/// delivered by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb8,
    Rgb15,
    Rgb16,
    Rgb24,
    Rgb32,
    Argb32,
    Yuyv,
    Uyvy,
    Jpeg,
    Png,
}

impl PixelFormat {
    pub fn is_rgb(&self) -> bool {
        matches!(
            self,
            PixelFormat::Rgb8
                | PixelFormat::Rgb15
                | PixelFormat::Rgb16
                | PixelFormat::Rgb24
                | PixelFormat::Rgb32
                | PixelFormat::Argb32
        )
    }

    pub fn is_yuv(&self) -> bool {
        matches!(self, PixelFormat::Yuyv | PixelFormat::Uyvy)
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, PixelFormat::Jpeg | PixelFormat::Png)
    }

    /// Bit depth a driver reports for this encoding.
    pub fn default_bits_per_pixel(&self) -> u16 {
        match self {
            PixelFormat::Rgb8 => 8,
            PixelFormat::Rgb15 | PixelFormat::Rgb16 => 16,
            PixelFormat::Yuyv | PixelFormat::Uyvy => 16,
            PixelFormat::Rgb24 | PixelFormat::Jpeg | PixelFormat::Png => 24,
            PixelFormat::Rgb32 | PixelFormat::Argb32 => 32,
        }
    }

    /// DIB `biCompression` value for this encoding.
    pub fn compression(&self) -> u32 {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Rgb15 | PixelFormat::Rgb24 | PixelFormat::Rgb32 => {
                BI_RGB
            }
            PixelFormat::Rgb16 | PixelFormat::Argb32 => BI_BITFIELDS,
            PixelFormat::Yuyv => FOURCC_YUY2,
            PixelFormat::Uyvy => FOURCC_UYVY,
            PixelFormat::Jpeg => FOURCC_MJPG,
            PixelFormat::Png => BI_PNG,
        }
    }

    /// Interpret a DIB `biCompression`/`biBitCount` pair.
    ///
    /// Returns `None` for combinations camlet cannot normalize.
    pub fn from_compression(compression: u32, bit_count: u16) -> Option<Self> {
        match (compression, bit_count) {
            (BI_RGB, 8) => Some(PixelFormat::Rgb8),
            (BI_RGB, 16) => Some(PixelFormat::Rgb15),
            (BI_RGB, 24) => Some(PixelFormat::Rgb24),
            (BI_RGB, 32) => Some(PixelFormat::Rgb32),
            (BI_BITFIELDS, 16) => Some(PixelFormat::Rgb16),
            (BI_BITFIELDS, 32) => Some(PixelFormat::Argb32),
            (FOURCC_YUY2 | FOURCC_YUYV, 16) => Some(PixelFormat::Yuyv),
            (FOURCC_UYVY, 16) => Some(PixelFormat::Uyvy),
            (FOURCC_MJPG | BI_JPEG, _) => Some(PixelFormat::Jpeg),
            (BI_PNG, _) => Some(PixelFormat::Png),
            _ => None,
        }
    }
}

/// A capture format: either what the caller asked for or what the driver
/// actually negotiated. The two are kept as separate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameFormat {
    width: u32,
    height: u32,
    bits_per_pixel: u16,
    pixel_format: PixelFormat,
    frames_per_1000_second: u32,
    top_down: bool,
}

impl FrameFormat {
    /// Build a validated format. All numeric fields must be non-zero.
    pub fn new(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        bits_per_pixel: u16,
        frames_per_1000_second: u32,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidFormat(format!(
                "frame size must be positive, got {width}x{height}"
            )));
        }
        if bits_per_pixel == 0 {
            return Err(ImageError::InvalidFormat(
                "bits per pixel must be positive".to_string(),
            ));
        }
        if frames_per_1000_second == 0 {
            return Err(ImageError::InvalidFormat(
                "frame rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            bits_per_pixel,
            pixel_format,
            frames_per_1000_second,
            top_down: false,
        })
    }

    /// Mark the source rows as stored top-down (a negative DIB height).
    ///
    /// Only meaningful for RGB encodings, which are bottom-up by default.
    pub fn with_top_down(mut self, top_down: bool) -> Self {
        self.top_down = top_down;
        self
    }

    /// Shorthand using the encoding's usual bit depth and a whole-number rate.
    pub fn with_fps(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        fps: u32,
    ) -> Result<Self, ImageError> {
        Self::new(
            width,
            height,
            pixel_format,
            pixel_format.default_bits_per_pixel(),
            fps.saturating_mul(1000),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn frames_per_1000_second(&self) -> u32 {
        self.frames_per_1000_second
    }

    pub fn is_top_down(&self) -> bool {
        self.top_down
    }

    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_1000_second as f64 / 1000.0
    }
}

impl Default for FrameFormat {
    /// 640x480 YUYV at 30 frames per second.
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            bits_per_pixel: 16,
            pixel_format: PixelFormat::Yuyv,
            frames_per_1000_second: 30_000,
            top_down: false,
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {:?} {}bpp @ {:.3}fps",
            self.width,
            self.height,
            self.pixel_format,
            self.bits_per_pixel,
            self.frames_per_second()
        )?;
        if self.top_down {
            write!(f, " top-down")?;
        }
        Ok(())
    }
}
