use anyhow::{anyhow, Result};
use log::info;
use nalgebra::{point, vector};
use reelgfx::{
    shapes::{
        draw_arc, draw_box, draw_circle, draw_cross, draw_quad, draw_rounded_rect,
        draw_textured_quad, write_quad,
    },
    Anchor, ArenaUsage, Batch, BatchConfig, Color, Error, Extent2D, QuadFace, Region,
    TextureFormat,
};

const ATLAS_SIZE: u32 = 256;

/// Coverage bitmap of a filled disc, standing in for a rasterized glyph.
fn disc_bitmap(diameter: u32) -> Vec<u8> {
    let radius = diameter as f32 / 2.0;
    (0..diameter * diameter)
        .map(|i| {
            let x = (i % diameter) as f32 + 0.5 - radius;
            let y = (i / diameter) as f32 + 0.5 - radius;
            let coverage = (radius - (x * x + y * y).sqrt()).clamp(0.0, 1.0);
            (coverage * 255.0) as u8
        })
        .collect()
}

struct App {
    batch: Batch,
    glyphs: Vec<Region>,
}

impl App {
    fn init() -> Result<Self> {
        let mut batch = BatchConfig::new()
            .with_atlas_size(ATLAS_SIZE)
            .with_atlas_format(TextureFormat::R8Unorm)
            .with_quad_capacity(1024)
            .build();

        let mut glyphs = Vec::new();
        for diameter in (4..48).step_by(3) {
            let bitmap = disc_bitmap(diameter);
            match batch.atlas_mut().insert(diameter, diameter, &bitmap) {
                Ok(region) => glyphs.push(region),
                // a real renderer would grow the atlas and re-insert everything
                Err(err @ Error::AtlasFull { .. }) => {
                    info!("{err}, stopping at {} glyphs", glyphs.len());
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(App { batch, glyphs })
    }

    fn draw(&mut self) -> Result<ArenaUsage> {
        let mut frame = self.batch.frame();
        let arena = &mut frame.arena;

        let background = Color::from_rgba_u8(0x20, 0x22, 0x28, 0xff);
        let accent = Color::from_rgba_u8(0xe0, 0x60, 0x40, 0xff);

        draw_quad(
            arena,
            Extent2D::new(0.0, 0.0, 700.0, 700.0),
            Anchor::TopLeft,
            background,
        )?;
        draw_rounded_rect(
            arena,
            Extent2D::new(350.0, 100.0, 300.0, 80.0),
            Anchor::Center,
            12.0,
            Color::WHITE,
        )?;
        draw_box(
            arena,
            Extent2D::new(350.0, 100.0, 310.0, 90.0),
            Anchor::Center,
            2.0,
            accent,
        )?;
        draw_cross(
            arena,
            Extent2D::new(640.0, 20.0, 16.0, 16.0),
            Anchor::TopLeft,
            3.0,
            accent,
        )?;
        draw_circle(arena, point![100.0, 300.0], vector![40.0, 40.0], accent, 32)?;
        draw_arc(
            arena,
            point![250.0, 300.0],
            vector![60.0, 30.0],
            Color::WHITE,
            24,
            45.0,
            270.0,
        )?;

        // a progress bar that gets resized in place
        let bar_start = arena.vertices_used();
        draw_quad(
            arena,
            Extent2D::new(50.0, 650.0, 10.0, 12.0),
            Anchor::BottomLeft,
            accent,
        )?;
        let bar = arena
            .face_mut::<QuadFace>(bar_start)
            .ok_or(anyhow!("progress bar quad went missing"))?;
        write_quad(
            Extent2D::new(50.0, 650.0, 420.0, 12.0).with_z(1.0),
            Anchor::BottomLeft,
            bar,
        );

        let mut pen_x = 50.0;
        for region in &self.glyphs {
            let uv = frame.atlas.uv(*region);
            draw_textured_quad(
                arena,
                Extent2D::new(pen_x, 500.0, region.width as f32, region.height as f32),
                Anchor::BottomLeft,
                uv,
                Color::WHITE,
            )?;
            pen_x += region.width as f32 + 4.0;
        }

        Ok(frame.finish())
    }

    fn save_atlas(&mut self, path: &str) -> Result<()> {
        let atlas = self.batch.atlas_mut();
        if let Some(dirty) = atlas.take_dirty() {
            info!("atlas dirty region {dirty:?}");
        }
        image::GrayImage::from_raw(ATLAS_SIZE, ATLAS_SIZE, atlas.pixels().to_vec())
            .ok_or(anyhow!("atlas pixels don't match a {ATLAS_SIZE}px gray image"))?
            .save(path)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut app = App::init()?;
    let usage = app.draw()?;
    info!(
        "frame used {} / {} vertices, {} / {} indices ({} bytes to upload)",
        usage.vertices,
        app.batch.vertex_capacity(),
        usage.indices,
        app.batch.index_capacity(),
        app.batch.vertex_bytes(usage).len() + app.batch.index_bytes(usage).len(),
    );
    app.save_atlas("atlas.png")?;
    info!("wrote atlas.png with {} glyphs", app.glyphs.len());
    Ok(())
}
