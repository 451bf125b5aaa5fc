use log::trace;

use crate::{
    atlas::{AtlasAllocator, Region, UvRect},
    error::Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFormat {
    /// Single channel coverage, e.g. rasterized glyphs.
    #[default]
    R8Unorm,
    Rgba8Unorm,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm => 4,
        }
    }
}

/// An atlas allocator together with the CPU copy of the canvas it packs.
///
/// Payloads are copied in as they are reserved; the renderer uploads `pixels()` (or just the
/// [`take_dirty`](Self::take_dirty) rectangle) to the GPU texture.
#[derive(Debug, Clone)]
pub struct AtlasTexture {
    allocator: AtlasAllocator,
    format: TextureFormat,
    data: Vec<u8>,
    dirty: Region,
}

impl AtlasTexture {
    pub fn new(size: u32, format: TextureFormat) -> Self {
        let allocator = AtlasAllocator::new(size);
        let len = size as usize * size as usize * format.bytes_per_pixel();
        Self {
            allocator,
            format,
            data: vec![0; len],
            dirty: Region::default(),
        }
    }

    pub fn size(&self) -> u32 {
        self.allocator.size()
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn allocator(&self) -> &AtlasAllocator {
        &self.allocator
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> usize {
        self.size() as usize * self.format.bytes_per_pixel()
    }

    pub fn uv(&self, region: Region) -> UvRect {
        region.uv(self.size())
    }

    /// Reserves room for a `width x height` payload and copies it in.
    ///
    /// `pixels` is tightly packed rows in this texture's format. Nothing is written if the atlas
    /// is full.
    ///
    /// # Panics
    ///
    /// If `pixels` does not hold exactly `width * height` pixels.
    pub fn insert(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<Region> {
        let bpp = self.format.bytes_per_pixel();
        let row_len = width as usize * bpp;
        assert_eq!(
            pixels.len(),
            row_len * height as usize,
            "payload of {width}x{height} {:?} has the wrong length",
            self.format
        );

        let region = self.allocator.reserve(width, height)?;
        if region.is_empty() {
            return Ok(region);
        }

        let stride = self.bytes_per_row();
        for (row, source) in pixels.chunks_exact(row_len).enumerate() {
            let start = (region.y as usize + row) * stride + region.x as usize * bpp;
            self.data[start..start + row_len].copy_from_slice(source);
        }
        self.dirty = self.dirty.union(&region);

        trace!("atlas texture wrote {region:?}");
        Ok(region)
    }

    /// Returns the area written since the last call, if any.
    pub fn take_dirty(&mut self) -> Option<Region> {
        let dirty = std::mem::take(&mut self.dirty);
        (!dirty.is_empty()).then_some(dirty)
    }

    /// Empties the atlas. Pixels are zeroed in place and the whole canvas is marked dirty.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.data.fill(0);
        let size = self.size();
        self.dirty = Region {
            x: 0,
            y: 0,
            width: size,
            height: size,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn payload_lands_at_region() {
        let mut atlas = AtlasTexture::new(8, TextureFormat::R8Unorm);
        let region = atlas.insert(2, 2, &[1, 2, 3, 4]).unwrap();
        assert_eq!((region.x, region.y), (1, 1));

        let pixels = atlas.pixels();
        assert_eq!(&pixels[8 + 1..8 + 3], &[1, 2]);
        assert_eq!(&pixels[16 + 1..16 + 3], &[3, 4]);
        assert_eq!(pixels.iter().filter(|&&p| p != 0).count(), 4);
    }

    #[test]
    fn rgba_rows_are_strided() {
        let mut atlas = AtlasTexture::new(4, TextureFormat::Rgba8Unorm);
        let payload: Vec<u8> = (1..=8).collect();
        let region = atlas.insert(1, 2, &payload).unwrap();
        let stride = atlas.bytes_per_row();
        assert_eq!(stride, 16);
        let first = region.y as usize * stride + region.x as usize * 4;
        assert_eq!(&atlas.pixels()[first..first + 4], &[1, 2, 3, 4]);
        assert_eq!(&atlas.pixels()[first + stride..first + stride + 4], &[5, 6, 7, 8]);
    }

    #[test]
    fn dirty_accumulates_and_resets() {
        let mut atlas = AtlasTexture::new(16, TextureFormat::R8Unorm);
        assert_eq!(atlas.take_dirty(), None);
        atlas.insert(3, 3, &[9; 9]).unwrap();
        atlas.insert(2, 5, &[9; 10]).unwrap();
        assert_eq!(
            atlas.take_dirty(),
            Some(Region {
                x: 1,
                y: 1,
                width: 5,
                height: 5
            })
        );
        assert_eq!(atlas.take_dirty(), None);
    }

    #[test]
    fn full_atlas_writes_nothing() {
        let mut atlas = AtlasTexture::new(4, TextureFormat::R8Unorm);
        let err = atlas.insert(3, 3, &[7; 9]).unwrap_err();
        assert!(matches!(err, Error::AtlasFull { .. }));
        assert!(atlas.pixels().iter().all(|&p| p == 0));
        assert_eq!(atlas.take_dirty(), None);
    }

    #[test]
    fn clear_zeroes_pixels() {
        let mut atlas = AtlasTexture::new(8, TextureFormat::R8Unorm);
        atlas.insert(2, 2, &[5; 4]).unwrap();
        atlas.take_dirty();
        atlas.clear();
        assert!(atlas.pixels().iter().all(|&p| p == 0));
        assert!(atlas.allocator().is_empty());
        assert_eq!(atlas.take_dirty().map(|r| r.width), Some(8));
    }

    #[test]
    #[should_panic]
    fn payload_length_is_checked() {
        let mut atlas = AtlasTexture::new(8, TextureFormat::Rgba8Unorm);
        let _ = atlas.insert(2, 2, &[0; 4]);
    }
}
