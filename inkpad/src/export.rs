//! Saving the composited display.

use inkpad_core::surface::RasterSurface;

/// Encode `surface` as an 8-bit straight-alpha RGBA PNG.
pub fn write_png(target: impl std::io::Write, surface: &RasterSurface) -> anyhow::Result<()> {
    let mut encoder = png::Encoder::new(target, surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&surface.to_rgba8())?;
    writer.finish()?;
    Ok(())
}

pub fn save_png(path: &std::path::Path, surface: &RasterSurface) -> anyhow::Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_png(file, surface)?;
    log::info!(
        "wrote {}x{} image to {path:?}",
        surface.width(),
        surface.height()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use inkpad_core::{
        color::Color,
        state::Canvas,
        surface::{Surface, SurfaceError},
    };

    #[test]
    fn encodes_display() -> Result<(), SurfaceError> {
        let canvas = Canvas {
            width: 16.0,
            height: 8.0,
            scale_factor: 2.0,
        };
        let mut surface = RasterSurface::allocate(&canvas)?;
        surface.fill_circle([8.0, 4.0], 2.0, Color::BLACK);

        let mut bytes = Vec::new();
        write_png(&mut bytes, &surface).unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut image = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut image).unwrap();
        assert_eq!((info.width, info.height), (32, 16));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        // Center pixel of the dot is opaque black, the corner is transparent.
        let center = (8 * 32 + 16) * 4;
        assert_eq!(&image[center..center + 4], &[0, 0, 0, 255]);
        assert_eq!(&image[0..4], &[0, 0, 0, 0]);
        Ok(())
    }
}
