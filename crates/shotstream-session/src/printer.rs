use crate::handler::ResponseHandler;
use shotstream_core::{AnnotationResponse, OutputError};
use std::io::Write;

pub const HEADER: &str = "Reading response.";

/// Writes `Shot: <start>s to <end>s` lines, one per shot annotation.
pub struct ShotPrinter<W> {
    out: W,
    shots_printed: usize,
}

impl ShotPrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ShotPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shots_printed: 0,
        }
    }

    pub fn shots_printed(&self) -> usize {
        self.shots_printed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResponseHandler for ShotPrinter<W> {
    fn on_open(&mut self) -> Result<(), OutputError> {
        writeln!(self.out, "{HEADER}")?;
        self.out.flush()?;
        Ok(())
    }

    fn handle(&mut self, response: &AnnotationResponse) -> Result<(), OutputError> {
        for shot in &response.shots {
            writeln!(self.out, "{shot}")?;
            self.shots_printed += 1;
        }
        self.out.flush()?;
        Ok(())
    }
}
