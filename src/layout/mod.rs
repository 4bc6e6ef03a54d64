//! Layout utilities: margins, the greedy line wrapper, and the page cursor
//! that tracks vertical position and allocates pages during rendering.

mod cursor;
mod margins;
mod text;

pub use cursor::*;
pub use margins::*;
pub use text::*;
