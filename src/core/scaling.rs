//! Smooth resampling of 32bpp pixel buffers.
//!
//! Magnification uses bilinear interpolation; minification averages every
//! source pixel under the destination footprint. Alpha is resampled like
//! the colour channels. Output is visually smooth, not pixel exact.

use super::extent::ClientSize;

/// Stretch `src` to fill `dst` with a smoothing filter.
///
/// Both slices must hold exactly `size.pixel_count()` words; mismatched or
/// empty inputs leave `dst` untouched.
pub fn stretch_smooth(src: &[u32], src_size: ClientSize, dst: &mut [u32], dst_size: ClientSize) {
    if src_size.is_empty()
        || dst_size.is_empty()
        || src.len() != src_size.pixel_count()
        || dst.len() != dst_size.pixel_count()
    {
        return;
    }

    if src_size == dst_size {
        dst.copy_from_slice(src);
        return;
    }

    let scale_x = src_size.width as f32 / dst_size.width as f32;
    let scale_y = src_size.height as f32 / dst_size.height as f32;

    if scale_x <= 1.0 && scale_y <= 1.0 {
        stretch_bilinear(src, src_size, dst, dst_size, scale_x, scale_y);
    } else {
        stretch_box(src, src_size, dst, dst_size, scale_x, scale_y);
    }
}

fn stretch_bilinear(
    src: &[u32],
    src_size: ClientSize,
    dst: &mut [u32],
    dst_size: ClientSize,
    scale_x: f32,
    scale_y: f32,
) {
    let max_x = (src_size.width - 1) as f32;
    let max_y = (src_size.height - 1) as f32;
    let src_w = src_size.width as usize;

    for (dy, row) in dst.chunks_exact_mut(dst_size.width as usize).enumerate() {
        let fy = ((dy as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(src_size.height as usize - 1);
        let ty = fy - y0 as f32;

        for (dx, out) in row.iter_mut().enumerate() {
            let fx = ((dx as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let tx = fx - x0 as f32;

            let top = lerp_pixel(src[y0 * src_w + x0], src[y0 * src_w + x1], tx);
            let bottom = lerp_pixel(src[y1 * src_w + x0], src[y1 * src_w + x1], tx);
            *out = lerp_pixel(top, bottom, ty);
        }
    }
}

fn stretch_box(
    src: &[u32],
    src_size: ClientSize,
    dst: &mut [u32],
    dst_size: ClientSize,
    scale_x: f32,
    scale_y: f32,
) {
    let src_w = src_size.width as usize;
    let span = |d: usize, scale: f32, limit: u32| -> (usize, usize) {
        let start = ((d as f32 * scale).floor() as usize).min(limit as usize - 1);
        let end = (((d + 1) as f32 * scale).ceil() as usize).clamp(start + 1, limit as usize);
        (start, end)
    };

    for (dy, row) in dst.chunks_exact_mut(dst_size.width as usize).enumerate() {
        let (y0, y1) = span(dy, scale_y, src_size.height);

        for (dx, out) in row.iter_mut().enumerate() {
            let (x0, x1) = span(dx, scale_x, src_size.width);

            // u64 lanes: one footprint may cover more than u32::MAX / 255 pixels
            let mut sum = [0u64; 4];
            for y in y0..y1 {
                for &pixel in &src[y * src_w + x0..y * src_w + x1] {
                    for (lane, acc) in sum.iter_mut().enumerate() {
                        *acc += u64::from((pixel >> (lane * 8)) & 0xFF);
                    }
                }
            }

            let count = ((y1 - y0) * (x1 - x0)) as u64;
            *out = sum.iter().enumerate().fold(0u32, |acc, (lane, &total)| {
                let mean = ((total + count / 2) / count) as u32;
                acc | (mean << (lane * 8))
            });
        }
    }
}

/// Per-channel linear blend of two packed pixels
fn lerp_pixel(a: u32, b: u32, t: f32) -> u32 {
    if a == b || t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }

    (0..4).fold(0u32, |acc, lane| {
        let shift = lane * 8;
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        let c = (ca + (cb - ca) * t).round() as u32;
        acc | (c.min(255) << shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_color_survives_any_scale() {
        let src = vec![0xFF336699u32; 6 * 4];
        for (w, h) in [(12, 8), (3, 2), (7, 5), (1, 1)] {
            let mut dst = vec![0u32; w * h];
            stretch_smooth(&src, ClientSize::new(6, 4), &mut dst, ClientSize::new(w as u32, h as u32));
            assert!(dst.iter().all(|&p| p == 0xFF336699), "failed at {}x{}", w, h);
        }
    }

    #[test]
    fn test_same_size_copies() {
        let src: Vec<u32> = (0..16).collect();
        let mut dst = vec![0u32; 16];
        stretch_smooth(&src, ClientSize::new(4, 4), &mut dst, ClientSize::new(4, 4));
        assert_eq!(dst, src);
    }

    #[test]
    fn test_downscale_averages_blocks() {
        // 4x2 source: left half black, right half white -> 2x1 keeps both
        let src = vec![
            0xFF000000, 0xFF000000, 0xFFFFFFFF, 0xFFFFFFFF,
            0xFF000000, 0xFF000000, 0xFFFFFFFF, 0xFFFFFFFF,
        ];
        let mut dst = vec![0u32; 2];
        stretch_smooth(&src, ClientSize::new(4, 2), &mut dst, ClientSize::new(2, 1));
        assert_eq!(dst, vec![0xFF000000, 0xFFFFFFFF]);

        // 2x1 -> 1x1 mixes to mid grey
        let mut single = vec![0u32; 1];
        stretch_smooth(&dst, ClientSize::new(2, 1), &mut single, ClientSize::new(1, 1));
        assert_eq!(single[0], 0xFF808080);
    }

    #[test]
    fn test_huge_footprint_averages_without_overflow() {
        // 4200x4200 -> 1x1: one destination pixel covers ~17.6M source pixels
        let size = ClientSize::new(4200, 4200);
        let src = vec![0xFFFFFFFFu32; size.pixel_count()];
        let mut dst = vec![0u32; 1];
        stretch_smooth(&src, size, &mut dst, ClientSize::new(1, 1));
        assert_eq!(dst[0], 0xFFFFFFFF);
    }

    #[test]
    fn test_mixed_axis_scale_stretches_and_averages() {
        // 4x1 -> 2x3: x shrinks by half, y grows threefold
        let src = vec![0xFF000000, 0xFF000000, 0xFF0000FF, 0xFF0000FF];
        let mut dst = vec![0u32; 6];
        stretch_smooth(&src, ClientSize::new(4, 1), &mut dst, ClientSize::new(2, 3));

        for row in dst.chunks_exact(2) {
            assert_eq!(row, &[0xFF000000, 0xFF0000FF]);
        }
    }

    #[test]
    fn test_upscale_interpolates_between_pixels() {
        let src = vec![0xFF000000, 0xFFFFFFFF];
        let mut dst = vec![0u32; 4];
        stretch_smooth(&src, ClientSize::new(2, 1), &mut dst, ClientSize::new(4, 1));

        // Edges clamp to the source pixels, the middle is blended
        assert_eq!(dst[0], 0xFF000000);
        assert_eq!(dst[3], 0xFFFFFFFF);
        let mid_blue = dst[1] & 0xFF;
        assert!(mid_blue > 0 && mid_blue < 255);
        assert!(dst[1] & 0xFF < dst[2] & 0xFF);
    }

    #[test]
    fn test_mismatched_lengths_leave_dst_untouched() {
        let src = vec![1u32; 3];
        let mut dst = vec![9u32; 4];
        stretch_smooth(&src, ClientSize::new(2, 2), &mut dst, ClientSize::new(2, 2));
        assert_eq!(dst, vec![9; 4]);
    }

    #[test]
    fn test_lerp_pixel_endpoints() {
        assert_eq!(lerp_pixel(0x00000000, 0xFFFFFFFF, 0.0), 0x00000000);
        assert_eq!(lerp_pixel(0x00000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(lerp_pixel(0x00000000, 0x00000064, 0.5), 0x00000032);
    }
}
