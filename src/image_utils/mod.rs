pub mod drawing;
pub mod image_codec;
pub mod image_conversion;
pub mod padding;
