use crate::{ImageError, PixelFormat, transcode::yuv_to_rgb};
use camlet_base::log;
use crates_image::ImageEncoder;

/// Packed 8-bit RGB, rows top-down, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Reusable destination for captured frames.
///
/// The backing allocation only grows; a buffer handed to every capture call
/// settles at the largest frame seen and stops allocating.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    data: Vec<u8>,
    len: usize,
    width: u32,
    height: u32,
    stride: usize,
    pixel_format: Option<PixelFormat>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate `capacity` bytes, e.g. from `image_size` of the negotiated format.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            ..Self::default()
        }
    }

    /// Describe the next image and hand out exactly `size` writable bytes.
    pub(crate) fn prepare(
        &mut self,
        width: u32,
        height: u32,
        stride: usize,
        pixel_format: PixelFormat,
        size: usize,
    ) -> &mut [u8] {
        if self.data.len() < size {
            log::debug!("capture buffer grows from {} to {} bytes", self.data.len(), size);
            self.data.resize(size, 0);
        }
        self.len = size;
        self.width = width;
        self.height = height;
        self.stride = stride;
        self.pixel_format = Some(pixel_format);
        &mut self.data[..size]
    }

    /// Bytes allocated, independent of the current image.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row; 0 for compressed content.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Encoding of the current content, `None` before the first capture.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.pixel_format
    }

    /// The current image, borrowed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The current image, copied out.
    pub fn extract_image(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Decode the current content into packed RGB.
    pub fn to_rgb(&self) -> Result<RgbFrame, ImageError> {
        let pixel_format = self
            .pixel_format
            .ok_or_else(|| ImageError::Decode("capture buffer is empty".to_string()))?;
        let (width, height) = (self.width as usize, self.height as usize);
        let bytes = self.as_bytes();

        let row_bytes = match pixel_format {
            PixelFormat::Rgb24 => width * 3,
            PixelFormat::Rgb32 | PixelFormat::Argb32 => width * 4,
            PixelFormat::Yuyv | PixelFormat::Uyvy => width.div_ceil(2) * 4,
            _ => 0,
        };
        if self.stride < row_bytes {
            return Err(ImageError::InvalidFormat(format!(
                "{pixel_format:?} rows need {row_bytes} bytes, stride is {}",
                self.stride
            )));
        }

        let data = match pixel_format {
            PixelFormat::Rgb24 => self.rows(|row, out| {
                for px in row[..width * 3].chunks_exact(3) {
                    out.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }),
            PixelFormat::Rgb32 | PixelFormat::Argb32 => self.rows(|row, out| {
                for px in row[..width * 4].chunks_exact(4) {
                    out.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }),
            PixelFormat::Yuyv | PixelFormat::Uyvy => {
                let (y0, u, y1, v) = if pixel_format == PixelFormat::Uyvy {
                    (1, 0, 3, 2)
                } else {
                    (0, 1, 2, 3)
                };
                self.rows(|row, out| {
                    for (pair, mp) in row.chunks_exact(4).take(width.div_ceil(2)).enumerate() {
                        let (r, g, b) = yuv_to_rgb(mp[y0], mp[u], mp[v]);
                        out.extend_from_slice(&[r, g, b]);
                        if pair * 2 + 1 < width {
                            let (r, g, b) = yuv_to_rgb(mp[y1], mp[u], mp[v]);
                            out.extend_from_slice(&[r, g, b]);
                        }
                    }
                })
            }
            PixelFormat::Jpeg | PixelFormat::Png => {
                let decoded = crates_image::load_from_memory(bytes)?.to_rgb8();
                let (width, height) = decoded.dimensions();
                return Ok(RgbFrame {
                    width,
                    height,
                    data: decoded.into_raw(),
                });
            }
            PixelFormat::Rgb8 | PixelFormat::Rgb15 | PixelFormat::Rgb16 => {
                return Err(ImageError::Unsupported(format!(
                    "{pixel_format:?} has no RGB conversion"
                )));
            }
        };

        if data.len() != width * height * 3 {
            return Err(ImageError::Decode(format!(
                "expected {} RGB bytes, got {}",
                width * height * 3,
                data.len()
            )));
        }
        Ok(RgbFrame {
            width: self.width,
            height: self.height,
            data,
        })
    }

    fn rows(&self, mut convert: impl FnMut(&[u8], &mut Vec<u8>)) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        if self.stride > 0 {
            for row in self.as_bytes().chunks_exact(self.stride) {
                convert(row, &mut out);
            }
        }
        out
    }

    /// Encode the current content as a BMP file.
    pub fn encode_bmp(&self) -> Result<Vec<u8>, ImageError> {
        let frame = self.to_rgb()?;
        let mut out = Vec::new();
        crates_image::codecs::bmp::BmpEncoder::new(&mut out)
            .write_image(
                &frame.data,
                frame.width,
                frame.height,
                crates_image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Encode the current content as JPEG (`quality` 1-100).
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, ImageError> {
        let frame = self.to_rgb()?;
        let mut out = Vec::new();
        crates_image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
            .write_image(
                &frame.data,
                frame.width,
                frame.height,
                crates_image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(out)
    }
}
