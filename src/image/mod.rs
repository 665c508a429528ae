pub mod io;
pub mod mask;
pub mod rgba;
pub mod traits;

pub use self::mask::Mask;
pub use self::rgba::{ImageRgbaF32, CHANNELS};
pub use self::traits::{ImageView, ImageViewMut, Rows};
