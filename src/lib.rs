// Library exports for richmark

pub mod config;
pub mod richtext;
pub mod sample;
