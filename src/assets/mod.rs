pub mod color;
pub mod decode;
pub mod placeholder;
pub mod source;
