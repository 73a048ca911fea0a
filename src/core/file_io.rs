use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::image_utils::PixelBuffer;

pub fn date_time_string() -> String {
    use chrono::{Datelike, Local, Timelike};
    let local_time = Local::now();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        local_time.year(),
        local_time.month(),
        local_time.day(),
        local_time.hour(),
        local_time.minute(),
        local_time.second()
    )
}

pub fn maybe_date_time_string(enable: bool) -> Option<String> {
    if enable {
        Option::Some(date_time_string())
    } else {
        Option::None
    }
}

/**
 * Store a path and prefix together, making it easily to quickly generate
 * a collection of files with the same prefix, but separate suffixes.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct FilePrefix {
    pub directory_path: PathBuf,
    pub file_base: String,
}

impl FilePrefix {
    /**
     * Splits an output file name into its directory and base name, for example
     * `renders/mandelbrot.png` --> (`renders`, `mandelbrot`).
     */
    pub fn from_output_file(path: &Path) -> FilePrefix {
        let directory_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_base = path
            .file_stem()
            .and_then(|name| name.to_str())
            .unwrap_or("mandelbrot")
            .to_owned();
        FilePrefix {
            directory_path,
            file_base,
        }
    }

    pub fn with_sub_directory(mut self, sub_directory: &str) -> FilePrefix {
        self.directory_path.push(sub_directory);
        self
    }

    pub fn with_suffix(&self, suffix: &str) -> PathBuf {
        self.directory_path.join(self.file_base.clone() + suffix)
    }

    pub fn create_directory(&self) -> std::io::Result<()> {
        if self.directory_path.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.directory_path)
    }
}

pub fn serialize_to_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    log::info!("Wrote parameter file to: {}", path.display());
    Ok(())
}

/// Save the image to a file, deducing the type from the file name.
pub fn write_image(path: &Path, buffer: &PixelBuffer) -> image::ImageResult<()> {
    buffer.save(path)?;
    log::info!("Wrote image file to: {}", path.display());
    Ok(())
}
