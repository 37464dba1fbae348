//! Pixel transforms applied between decode and encode.
//!
//! - `flip_vertical`: mirror across the horizontal midline, in place.
//! - `remap_channels`: rewrite color channels per a `ChannelMap`, in place.
use crate::domain::model::{ChannelMap, ChannelSource, Operation, MAX_CHANNELS};
use crate::utils::error::{EtlError, Result};
use image::{imageops, DynamicImage, ImageBuffer, Pixel, Primitive};

/// Swap row `i` with row `height - 1 - i`. Width, height and pixel type are unchanged.
///
/// Flips the concrete buffer: going through `DynamicImage`'s own `GenericImage`
/// impl would round-trip every pixel through 8-bit RGBA.
pub fn flip_vertical(image: &mut DynamicImage) {
    match image {
        DynamicImage::ImageLuma8(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageLumaA8(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgb8(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgba8(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageLuma16(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageLumaA16(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgb16(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgba16(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgb32F(buf) => imageops::flip_vertical_in_place(buf),
        DynamicImage::ImageRgba32F(buf) => imageops::flip_vertical_in_place(buf),
        other => *other = other.flipv(),
    }
}

pub fn remap_channels(image: &mut DynamicImage, map: &ChannelMap) -> Result<()> {
    let channel_count = image.color().channel_count() as usize;

    if map.sources().len() > channel_count {
        return Err(EtlError::ProcessingError {
            message: format!(
                "channel map '{}' writes {} channels but the image has {}",
                map,
                map.sources().len(),
                channel_count
            ),
        });
    }
    if let Some(max) = map.max_source() {
        if max >= channel_count {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "channel map '{}' reads channel {} but the image has {}",
                    map, max, channel_count
                ),
            });
        }
    }

    match image {
        DynamicImage::ImageLuma8(buf) => remap_buffer(buf, map),
        DynamicImage::ImageLumaA8(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgb8(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgba8(buf) => remap_buffer(buf, map),
        DynamicImage::ImageLuma16(buf) => remap_buffer(buf, map),
        DynamicImage::ImageLumaA16(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgb16(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgba16(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgb32F(buf) => remap_buffer(buf, map),
        DynamicImage::ImageRgba32F(buf) => remap_buffer(buf, map),
        other => {
            return Err(EtlError::ProcessingError {
                message: format!("unsupported pixel layout {:?}", other.color()),
            })
        }
    }

    Ok(())
}

fn remap_buffer<P>(buf: &mut ImageBuffer<P, Vec<P::Subpixel>>, map: &ChannelMap)
where
    P: Pixel,
{
    let zero = <P::Subpixel as Primitive>::DEFAULT_MIN_VALUE;
    let count = P::CHANNEL_COUNT as usize;

    for pixel in buf.pixels_mut() {
        let mut original = [zero; MAX_CHANNELS];
        original[..count].copy_from_slice(pixel.channels());

        let channels = pixel.channels_mut();
        for (out, source) in map.sources().iter().enumerate() {
            channels[out] = match source {
                ChannelSource::Channel(index) => original[*index],
                ChannelSource::Zero => zero,
            };
        }
    }
}

/// Run `operations` in order. `RemapChannels` needs `channel_map`.
pub fn apply_operations(
    image: &mut DynamicImage,
    operations: &[Operation],
    channel_map: Option<&ChannelMap>,
) -> Result<()> {
    for operation in operations {
        match operation {
            Operation::FlipVertical => flip_vertical(image),
            Operation::RemapChannels => {
                let map = channel_map.ok_or_else(|| EtlError::MissingConfigError {
                    field: "channel_map".to_string(),
                })?;
                remap_channels(image, map)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, (x + y) as u8, 255 - y as u8])
        })
    }

    #[test]
    fn test_flip_inverts_row_order() {
        let source = gradient(5, 7);
        let mut image = DynamicImage::ImageRgba8(source.clone());
        flip_vertical(&mut image);

        let flipped = image.to_rgba8();
        assert_eq!(flipped.dimensions(), (5, 7));
        for y in 0..7 {
            for x in 0..5 {
                assert_eq!(flipped.get_pixel(x, y), source.get_pixel(x, 6 - y));
            }
        }
    }

    #[test]
    fn test_double_flip_is_identity() {
        for (w, h) in [(1, 1), (3, 1), (1, 4), (6, 5), (8, 8)] {
            let source = DynamicImage::ImageRgba8(gradient(w, h));
            let mut image = source.clone();
            flip_vertical(&mut image);
            flip_vertical(&mut image);
            assert_eq!(image, source);
        }
    }

    #[test]
    fn test_flip_keeps_pixel_type() {
        let mut image = DynamicImage::ImageLuma16(ImageBuffer::from_fn(2, 3, |_, y| {
            Luma([y as u16 * 1000])
        }));
        flip_vertical(&mut image);
        match &image {
            DynamicImage::ImageLuma16(buf) => {
                assert_eq!(buf.get_pixel(0, 0), &Luma([2000]));
                assert_eq!(buf.get_pixel(1, 2), &Luma([0]));
            }
            other => panic!("pixel type changed to {:?}", other.color()),
        }
    }

    #[test]
    fn test_mer_remap_on_rgb() {
        let mut image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        remap_channels(&mut image, &ChannelMap::mer()).unwrap();
        assert_eq!(image.to_rgb8().get_pixel(1, 1), &Rgb([10, 30, 0]));
    }

    #[test]
    fn test_mer_remap_leaves_alpha_alone() {
        let mut image =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 40])));
        remap_channels(&mut image, &ChannelMap::mer()).unwrap();
        assert_eq!(image.to_rgba8().get_pixel(0, 0), &Rgba([10, 30, 0, 40]));
    }

    #[test]
    fn test_remap_reads_original_values_not_updated_ones() {
        // swap red and green
        let map: ChannelMap = "g,r".parse().unwrap();
        let mut image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])));
        remap_channels(&mut image, &map).unwrap();
        assert_eq!(image.to_rgb8().get_pixel(0, 0), &Rgb([2, 1, 3]));
    }

    #[test]
    fn test_remap_rejects_map_wider_than_image() {
        let mut image = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([7])));
        let err = remap_channels(&mut image, &ChannelMap::mer()).unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
        assert_eq!(image.to_luma8().get_pixel(0, 0), &Luma([7]));
    }

    #[test]
    fn test_remap_rejects_missing_source_channel() {
        let map: ChannelMap = "a".parse().unwrap();
        let mut image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])));
        assert!(remap_channels(&mut image, &map).is_err());
    }

    #[test]
    fn test_apply_operations_in_order() {
        let source = RgbImage::from_fn(1, 2, |_, y| Rgb([y as u8, 100 + y as u8, 200]));
        let mut image = DynamicImage::ImageRgb8(source);
        let map = ChannelMap::mer();

        apply_operations(
            &mut image,
            &[Operation::FlipVertical, Operation::RemapChannels],
            Some(&map),
        )
        .unwrap();

        let out = image.to_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([1, 200, 0]));
        assert_eq!(out.get_pixel(0, 1), &Rgb([0, 200, 0]));
    }

    #[test]
    fn test_apply_remap_without_map_fails() {
        let mut image = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
        let err = apply_operations(&mut image, &[Operation::RemapChannels], None).unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigError { .. }));
    }
}
