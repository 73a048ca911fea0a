pub mod color_map;
pub mod config;
pub mod file_io;
pub mod image_utils;
pub mod interpolation;
pub mod stopwatch;
