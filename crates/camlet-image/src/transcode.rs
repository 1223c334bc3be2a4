use crate::{CaptureBuffer, FrameFormat, PixelFormat};

/// Bytes per row of a DIB: `width * bits` rounded up to a 4-byte boundary.
pub fn stride(width: u32, bits_per_pixel: u16) -> usize {
    (width as usize * bits_per_pixel as usize).div_ceil(32) * 4
}

/// Size in bytes of the image `transcode` writes for `format`.
///
/// `None` for compressed encodings: their size is whatever the frame carries.
pub fn image_size(format: &FrameFormat, transcode_yuv: bool) -> Option<usize> {
    let pixel_format = format.pixel_format();
    if pixel_format.is_compressed() {
        return None;
    }
    let bits = if pixel_format.is_yuv() && transcode_yuv {
        24
    } else {
        format.bits_per_pixel()
    };
    Some(stride(format.width(), bits) * format.height() as usize)
}

// BT.601 YUV-to-RGB conversion for a single pixel (fixed-point, shift 8)
pub(crate) fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = (y + ((359 * v) >> 8)).clamp(0, 255) as u8;
    let g = (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8;
    let b = (y + ((454 * u) >> 8)).clamp(0, 255) as u8;
    (r, g, b)
}

/// Copy or convert one captured frame into `buffer`.
///
/// - RGB encodings are copied with the row order reversed: drivers deliver
///   them bottom-up, the buffer holds them top-down. Formats marked
///   top-down are copied as they are.
/// - Packed YUV is converted to 24-bit RGB (DIB byte order) when
///   `transcode_yuv` is set, otherwise copied verbatim.
/// - Compressed frames are copied whole.
///
/// At most the expected image size is written; short frames leave the rest
/// of the image zeroed. The buffer only reallocates when it is too small.
pub fn transcode(
    format: &FrameFormat,
    data: &[u8],
    transcode_yuv: bool,
    buffer: &mut CaptureBuffer,
) {
    let width = format.width();
    let height = format.height();
    let pixel_format = format.pixel_format();

    if pixel_format.is_compressed() {
        let out = buffer.prepare(width, height, 0, pixel_format, data.len());
        out.copy_from_slice(data);
        return;
    }

    if pixel_format.is_yuv() && transcode_yuv {
        let dst_stride = stride(width, 24);
        let out = buffer.prepare(
            width,
            height,
            dst_stride,
            PixelFormat::Rgb24,
            dst_stride * height as usize,
        );
        packed_yuv_to_bgr(pixel_format, data, width, stride(width, 16), out, dst_stride);
        return;
    }

    let row = stride(width, format.bits_per_pixel());
    let out = buffer.prepare(width, height, row, pixel_format, row * height as usize);
    if pixel_format.is_rgb() && !format.is_top_down() {
        copy_flipped(data, out, row);
    } else {
        let n = data.len().min(out.len());
        out[..n].copy_from_slice(&data[..n]);
        out[n..].fill(0);
    }
}

/// Copy bottom-up rows from `src` into top-down rows of `dst`.
fn copy_flipped(src: &[u8], dst: &mut [u8], row: usize) {
    if row == 0 {
        return;
    }
    let rows = dst.len() / row;
    for (i, dst_row) in dst.chunks_exact_mut(row).enumerate() {
        let start = (rows - 1 - i) * row;
        if start >= src.len() {
            dst_row.fill(0);
            continue;
        }
        let end = (start + row).min(src.len());
        let n = end - start;
        dst_row[..n].copy_from_slice(&src[start..end]);
        dst_row[n..].fill(0);
    }
}

/// Convert YUYV or UYVY rows into B, G, R rows, top row first.
///
/// Packed YUV is stored top-down already, so row `y` of the source lands on
/// row `y` of the destination.
fn packed_yuv_to_bgr(
    pixel_format: PixelFormat,
    src: &[u8],
    width: u32,
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
) {
    // byte offsets of (y0, u, y1, v) inside a macro-pixel
    let (y0, u, y1, v) = match pixel_format {
        PixelFormat::Uyvy => (1, 0, 3, 2),
        _ => (0, 1, 2, 3),
    };
    let width = width as usize;

    for (row, dst_row) in dst.chunks_exact_mut(dst_stride).enumerate() {
        let start = row * src_stride;
        let src_row = src.get(start..(start + src_stride).min(src.len())).unwrap_or(&[]);
        dst_row.fill(0);

        for (pair, macro_pixel) in src_row.chunks_exact(4).take(width.div_ceil(2)).enumerate() {
            let x = pair * 2;
            let (r, g, b) = yuv_to_rgb(macro_pixel[y0], macro_pixel[u], macro_pixel[v]);
            dst_row[x * 3..x * 3 + 3].copy_from_slice(&[b, g, r]);
            if x + 1 < width {
                let (r, g, b) = yuv_to_rgb(macro_pixel[y1], macro_pixel[u], macro_pixel[v]);
                dst_row[x * 3 + 3..x * 3 + 6].copy_from_slice(&[b, g, r]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_alignment() {
        assert_eq!(stride(1, 24), 4);
        assert_eq!(stride(3, 24), 12);
        assert_eq!(stride(4, 24), 12);
        assert_eq!(stride(5, 16), 12);
        assert_eq!(stride(640, 32), 2560);
    }

    #[test]
    fn test_yuv_neutral_chroma_is_gray() {
        assert_eq!(yuv_to_rgb(128, 128, 128), (128, 128, 128));
        assert_eq!(yuv_to_rgb(0, 128, 128), (0, 0, 0));
        assert_eq!(yuv_to_rgb(255, 128, 128), (255, 255, 255));
    }
}
