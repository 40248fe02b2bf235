use crate::error::Result;
use crate::model::ChangeRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::{self, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// `[{...},{...}]`
    #[default]
    Compact,
    /// One-space indented records separated by newlines.
    Pretty,
}

/// Streams records into a single JSON array without holding them.
///
/// The writer owns the sink for the whole run. Dropping it without calling
/// [`ReportWriter::finish`] (an error or panic part way through) still closes
/// the array and flushes, so the file holds the records written so far as
/// valid JSON; the caller is expected to report the run as failed.
pub struct ReportWriter<W: Write> {
    out: Option<W>,
    style: ReportStyle,
    records: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn begin(mut out: W, style: ReportStyle) -> io::Result<Self> {
        out.write_all(b"[")?;
        if style == ReportStyle::Pretty {
            out.write_all(b"\n")?;
        }
        Ok(Self {
            out: Some(out),
            style,
            records: 0,
        })
    }

    pub fn write_record(&mut self, record: &ChangeRecord) -> Result<()> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| io::Error::other("report already closed"))?;

        if self.records > 0 {
            out.write_all(b",")?;
            if self.style == ReportStyle::Pretty {
                out.write_all(b"\n")?;
            }
        }

        match self.style {
            ReportStyle::Compact => serde_json::to_writer(&mut *out, record)?,
            ReportStyle::Pretty => {
                let mut ser =
                    serde_json::Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(b" "));
                record.serialize(&mut ser)?;
            }
        }

        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Close the array, flush, and hand the sink back.
    pub fn finish(mut self) -> io::Result<W> {
        let mut out = self
            .out
            .take()
            .ok_or_else(|| io::Error::other("report already closed"))?;
        close_array(&mut out, self.style)?;
        out.flush()?;
        Ok(out)
    }
}

impl<W: Write> Drop for ReportWriter<W> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            debug!(records = self.records, "Closing unfinished report");
            let _ = close_array(&mut out, self.style);
            let _ = out.flush();
        }
    }
}

fn close_array<W: Write>(out: &mut W, style: ReportStyle) -> io::Result<()> {
    match style {
        ReportStyle::Compact => out.write_all(b"]"),
        ReportStyle::Pretty => out.write_all(b"\n]\n"),
    }
}
