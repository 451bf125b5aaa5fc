use thiserror::Error;

/// Recoverable failures of the batching core.
///
/// Both variants leave the state they were raised from untouched: a failed reservation inserts no
/// skyline node and a failed allocation advances no cursor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No placement on the atlas canvas fits the requested region.
    /// Grow or rebuild the atlas and retry.
    #[error("atlas full: no room for a {width}x{height} region on a {canvas_size}px canvas")]
    AtlasFull {
        width: u32,
        height: u32,
        canvas_size: u32,
    },

    /// The vertex or index storage would overflow.
    /// Flush the current frame or raise the buffer capacity.
    #[error(
        "out of space: requested {vertices} vertices / {indices} indices, \
         {vertices_free} / {indices_free} free"
    )]
    OutOfSpace {
        vertices: usize,
        indices: usize,
        vertices_free: usize,
        indices_free: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
