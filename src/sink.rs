use std::io::Write;
use std::path::PathBuf;

use crate::color::{Color, resolve_rgb8};
use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};

/// Ordered, single-writer destination for finished rows.
///
/// `write_row` is called exactly `frame.height` times per render, strictly
/// in descending row order (image top first), only ever by the orchestrator.
/// Implementations are deliberately not thread-safe.
pub trait RowSink {
    fn write_row(&mut self, row: &[Color]) -> ScanrayResult<()>;

    /// Called once after the last row. Flush/commit point.
    fn finish(&mut self) -> ScanrayResult<()> {
        Ok(())
    }
}

/// Streaming plain-text PPM (`P3`) writer. The header is emitted on
/// construction; each row is resolved and written as it arrives.
pub struct PpmSink<W: Write> {
    writer: W,
    samples_per_pixel: u32,
}

impl<W: Write> PpmSink<W> {
    pub fn new(mut writer: W, frame: &Frame) -> ScanrayResult<Self> {
        writeln!(writer, "P3\n{} {}\n255", frame.width, frame.height)?;
        Ok(Self {
            writer,
            samples_per_pixel: frame.samples_per_pixel,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for PpmSink<W> {
    fn write_row(&mut self, row: &[Color]) -> ScanrayResult<()> {
        for &pixel in row {
            let [r, g, b] = resolve_rgb8(pixel, self.samples_per_pixel);
            writeln!(self.writer, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> ScanrayResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Buffered PNG writer. Rows accumulate top-to-bottom and the file is
/// encoded once on `finish`.
pub struct PngSink {
    path: PathBuf,
    image: image::RgbImage,
    next_image_row: u32,
    samples_per_pixel: u32,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>, frame: &Frame) -> Self {
        Self {
            path: path.into(),
            image: image::RgbImage::new(frame.width, frame.height),
            next_image_row: 0,
            samples_per_pixel: frame.samples_per_pixel,
        }
    }
}

impl RowSink for PngSink {
    fn write_row(&mut self, row: &[Color]) -> ScanrayResult<()> {
        if self.next_image_row >= self.image.height() {
            return Err(ScanrayError::validation(
                "more rows written than the frame height",
            ));
        }
        for (x, &pixel) in row.iter().enumerate() {
            let rgb = resolve_rgb8(pixel, self.samples_per_pixel);
            self.image
                .put_pixel(x as u32, self.next_image_row, image::Rgb(rgb));
        }
        self.next_image_row += 1;
        Ok(())
    }

    fn finish(&mut self) -> ScanrayResult<()> {
        if self.next_image_row != self.image.height() {
            return Err(ScanrayError::validation(format!(
                "png sink finished after {} of {} rows",
                self.next_image_row,
                self.image.height()
            )));
        }
        self.image
            .save(&self.path)
            .map_err(|e| ScanrayError::Other(anyhow::Error::new(e)))?;
        Ok(())
    }
}
