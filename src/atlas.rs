use itertools::Itertools;
use log::{debug, trace};

use crate::error::{Error, Result};

/// One segment of the skyline: the top edge of everything packed below `[x, x + width)`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct AtlasNode {
    pub x: u32,
    pub y: u32,
    pub width: u32,
}

/// A reserved area of the atlas canvas, in pixels.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest region covering both. An empty region is the identity.
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Fractional coordinates of this region on a square canvas of `canvas_size` pixels.
    pub fn uv(&self, canvas_size: u32) -> UvRect {
        let size = canvas_size as f32;
        UvRect {
            left: self.x as f32 / size,
            top: self.y as f32 / size,
            right: self.right() as f32 / size,
            bottom: self.bottom() as f32 / size,
        }
    }
}

/// Normalized texture coordinates, `[0, 1]` on both axes.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct UvRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };
}

impl From<UvRect> for [f32; 4] {
    fn from(uv: UvRect) -> Self {
        [uv.left, uv.top, uv.right, uv.bottom]
    }
}

/// Skyline packer for a fixed square canvas.
///
/// A one pixel border is kept free: placements start at `(1, 1)` and end at most at `size - 1`.
///
/// Nodes live in a plain `Vec` ordered by `x` and are inserted/removed in place, which is O(n)
/// per reservation. The defragment and merge passes rely on that ordering and on the nodes being
/// contiguous, so keep it a sequence.
#[derive(Debug, Clone)]
pub struct AtlasAllocator {
    size: u32,
    nodes: Vec<AtlasNode>,
}

impl AtlasAllocator {
    /// # Panics
    ///
    /// If `size < 2`, there is no room for the border.
    pub fn new(size: u32) -> Self {
        assert!(size >= 2, "atlas canvas must be at least 2px, got {size}");
        let mut allocator = Self {
            size,
            nodes: Vec::new(),
        };
        allocator.clear();
        allocator
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn nodes(&self) -> &[AtlasNode] {
        &self.nodes
    }

    /// True when nothing has been reserved since creation or the last [`clear`](Self::clear).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].y == 1
    }

    /// Forgets every reservation. The node storage is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(AtlasNode {
            x: 1,
            y: 1,
            width: self.size - 2,
        });
        debug!("atlas cleared ({}px)", self.size);
    }

    /// Places a `width x height` rectangle on the skyline.
    ///
    /// A zero-width request returns an empty region at `(0, 0)` and leaves the skyline alone. A
    /// zero-height one is placed like any other and only comes back empty.
    pub fn reserve(&mut self, width: u32, height: u32) -> Result<Region> {
        if width == 0 {
            return Ok(Region::default());
        }

        let mut best: Option<(usize, u32)> = None;
        let mut best_height = u32::MAX;
        let mut best_width = u32::MAX;

        for (i, node) in self.nodes.iter().enumerate() {
            let Some(y) = self.fit(i, width, height) else {
                continue;
            };
            let bottom = y + height;
            if bottom < best_height
                || (bottom == best_height && node.width > 0 && node.width < best_width)
            {
                best = Some((i, y));
                best_height = bottom;
                best_width = node.width;
            }
        }

        let Some((index, y)) = best else {
            debug!("atlas full: {width}x{height} does not fit in {}px", self.size);
            return Err(Error::AtlasFull {
                width,
                height,
                canvas_size: self.size,
            });
        };

        let region = Region {
            x: self.nodes[index].x,
            y,
            width,
            height,
        };
        self.insert_node(
            index,
            AtlasNode {
                x: region.x,
                y: region.bottom(),
                width,
            },
        );
        self.merge();

        trace!("atlas reserved {region:?}");
        Ok(region)
    }

    /// Returns the `y` a `width x height` rectangle would rest at when its left edge sits on node
    /// `index`, i.e. the tallest node it spans.
    fn fit(&self, index: usize, width: u32, height: u32) -> Option<u32> {
        let far_edge = self.size - 1;
        let x = self.nodes[index].x;
        if width > far_edge - x {
            return None;
        }

        let mut y = self.nodes[index].y;
        let mut remaining = width;
        for node in &self.nodes[index..] {
            y = y.max(node.y);
            if y > far_edge || height > far_edge - y {
                return None;
            }
            if node.width >= remaining {
                return Some(y);
            }
            remaining -= node.width;
        }
        None
    }

    /// Inserts the new top edge and trims the nodes it now covers.
    fn insert_node(&mut self, index: usize, node: AtlasNode) {
        self.nodes.insert(index, node);

        let mut i = index + 1;
        while i < self.nodes.len() {
            let previous = self.nodes[i - 1];
            let previous_right = previous.x + previous.width;
            let current = &mut self.nodes[i];
            if current.x >= previous_right {
                break;
            }

            let shrink = previous_right - current.x;
            current.x += shrink;
            current.width = current.width.saturating_sub(shrink);
            if current.width == 0 {
                self.nodes.remove(i);
            } else {
                break;
            }
        }
    }

    fn merge(&mut self) {
        self.nodes.dedup_by(|next, kept| {
            if next.y == kept.y {
                kept.width += next.width;
                true
            } else {
                false
            }
        });

        debug_assert!(
            self.nodes
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.x + a.width == b.x && a.y != b.y),
            "skyline lost contiguity: {:?}",
            self.nodes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_exactly_once() {
        let mut atlas = AtlasAllocator::new(34);
        let region = atlas.reserve(32, 32).unwrap();
        assert_eq!(
            region,
            Region {
                x: 1,
                y: 1,
                width: 32,
                height: 32
            }
        );
        assert!(matches!(
            atlas.reserve(1, 1),
            Err(Error::AtlasFull { width: 1, height: 1, canvas_size: 34 })
        ));
    }

    #[test]
    fn packs_side_by_side() {
        let mut atlas = AtlasAllocator::new(32);
        let a = atlas.reserve(15, 30).unwrap();
        let b = atlas.reserve(15, 30).unwrap();
        assert_eq!((a.x, a.y), (1, 1));
        assert_eq!((b.x, b.y), (16, 1));
        assert_eq!(
            atlas.nodes(),
            &[AtlasNode {
                x: 1,
                y: 31,
                width: 30
            }]
        );
        assert!(atlas.reserve(1, 1).is_err());
    }

    #[test]
    fn degenerate_reservation_leaves_nodes_alone() {
        let mut atlas = AtlasAllocator::new(64);
        atlas.reserve(10, 4).unwrap();
        let before = atlas.nodes().to_vec();
        assert_eq!(atlas.reserve(0, 0).unwrap(), Region::default());
        assert_eq!(atlas.nodes(), before.as_slice());
    }

    #[test]
    fn zero_height_is_placed_but_empty() {
        let mut atlas = AtlasAllocator::new(64);
        let region = atlas.reserve(5, 0).unwrap();
        assert_eq!(
            region,
            Region {
                x: 1,
                y: 1,
                width: 5,
                height: 0
            }
        );
        assert!(region.is_empty());
        assert!(atlas.is_empty());
    }

    #[test]
    fn oversized_requests_do_not_wrap() {
        let mut atlas = AtlasAllocator::new(64);
        atlas.reserve(10, 4).unwrap();
        let before = atlas.nodes().to_vec();
        for (width, height) in [(1, u32::MAX), (u32::MAX, 1), (u32::MAX, u32::MAX)] {
            assert_eq!(
                atlas.reserve(width, height),
                Err(Error::AtlasFull {
                    width,
                    height,
                    canvas_size: 64
                })
            );
        }
        assert_eq!(atlas.nodes(), before.as_slice());
    }

    #[test]
    fn failure_leaves_nodes_alone() {
        let mut atlas = AtlasAllocator::new(16);
        atlas.reserve(6, 6).unwrap();
        atlas.reserve(3, 9).unwrap();
        let before = atlas.nodes().to_vec();
        assert!(atlas.reserve(15, 1).is_err());
        assert!(atlas.reserve(1, 15).is_err());
        assert_eq!(atlas.nodes(), before.as_slice());
    }

    #[test]
    fn rests_on_tallest_spanned_node() {
        let mut atlas = AtlasAllocator::new(16);
        atlas.reserve(4, 10).unwrap();
        let short = atlas.reserve(10, 2).unwrap();
        assert_eq!((short.x, short.y), (5, 1));
        // only fits from the left edge, spanning both columns
        let wide = atlas.reserve(12, 1).unwrap();
        assert_eq!((wide.x, wide.y), (1, 11));
        assert_eq!(
            atlas.nodes(),
            &[
                AtlasNode {
                    x: 1,
                    y: 12,
                    width: 12
                },
                AtlasNode {
                    x: 13,
                    y: 3,
                    width: 2
                },
            ]
        );
    }

    #[test]
    fn prefers_lowest_resulting_top() {
        let mut atlas = AtlasAllocator::new(32);
        atlas.reserve(10, 8).unwrap();
        atlas.reserve(10, 2).unwrap();
        let region = atlas.reserve(5, 5).unwrap();
        assert_eq!((region.x, region.y), (21, 1));
    }

    #[test]
    fn ties_go_to_the_narrower_node() {
        let mut atlas = AtlasAllocator::new(32);
        atlas.reserve(10, 5).unwrap();
        atlas.reserve(3, 8).unwrap();
        atlas.reserve(4, 5).unwrap();
        atlas.reserve(13, 6).unwrap();
        assert_eq!(
            atlas.nodes(),
            &[
                AtlasNode {
                    x: 1,
                    y: 6,
                    width: 10
                },
                AtlasNode {
                    x: 11,
                    y: 9,
                    width: 3
                },
                AtlasNode {
                    x: 14,
                    y: 6,
                    width: 4
                },
                AtlasNode {
                    x: 18,
                    y: 7,
                    width: 13
                },
            ]
        );
        // both 6-high nodes give a top of 8, the 4px one is the tighter fit
        let region = atlas.reserve(3, 2).unwrap();
        assert_eq!((region.x, region.y), (14, 6));
    }

    #[test]
    fn clear_restores_seed() {
        let mut atlas = AtlasAllocator::new(128);
        atlas.reserve(20, 20).unwrap();
        atlas.reserve(30, 5).unwrap();
        assert!(!atlas.is_empty());
        atlas.clear();
        assert!(atlas.is_empty());
        assert_eq!(
            atlas.nodes(),
            &[AtlasNode {
                x: 1,
                y: 1,
                width: 126
            }]
        );
    }

    #[test]
    fn uv_divides_by_canvas() {
        let region = Region {
            x: 16,
            y: 32,
            width: 16,
            height: 64,
        };
        let uv = region.uv(128);
        assert_eq!(<[f32; 4]>::from(uv), [0.125, 0.25, 0.25, 0.75]);
    }

    #[test]
    fn union_ignores_empty() {
        let a = Region {
            x: 2,
            y: 2,
            width: 4,
            height: 4,
        };
        let b = Region {
            x: 10,
            y: 1,
            width: 2,
            height: 2,
        };
        assert_eq!(a.union(&Region::default()), a);
        assert_eq!(
            a.union(&b),
            Region {
                x: 2,
                y: 1,
                width: 10,
                height: 5
            }
        );
    }
}
