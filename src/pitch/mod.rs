pub mod buffer;
pub mod melody;
pub mod note;
