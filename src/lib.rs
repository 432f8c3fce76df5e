// Public library interface for canopymap
// Pure layout core: tree in, placed rectangles out. No I/O, no rendering.

pub mod layout;
pub mod tree;
pub mod viewport;
