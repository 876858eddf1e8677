mod bind_group;
mod double_buffered;
mod input;
mod mapped_uniform_buffer;
mod storage_buffer;
mod texture;

pub use self::bind_group::*;
pub use self::double_buffered::*;
pub use self::input::*;
pub use self::mapped_uniform_buffer::*;
pub use self::storage_buffer::*;
pub use self::texture::*;
