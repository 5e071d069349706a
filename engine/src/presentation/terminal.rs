// Plain-text presenter: status line plus the raw-data table
use super::Presenter;
use crate::error::EngineError;
use crate::pipeline::{Severity, ViewModel};
use shared::utils::{format_optional, format_timestamp, format_volume};
use std::io::Write;

const HEADERS: [&str; 11] = [
    "Datetime", "Open", "High", "Low", "Close", "Volume", "RSI", "EMA fast", "EMA slow", "MACD", "Signal",
];
const WIDTHS: [usize; 11] = [16, 10, 10, 10, 10, 14, 7, 10, 10, 9, 9];

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_to<W: Write>(&self, view: &ViewModel, out: &mut W) -> Result<(), EngineError> {
        let marker = match view.status.severity {
            Severity::Warning => "WARN",
            Severity::Success => "OK",
        };
        writeln!(
            out,
            "{} {} [{} / {}] via {}",
            view.request.ticker, marker, view.request.interval, view.request.period, view.provider
        )?;
        writeln!(out, "{}", view.status.message)?;
        if view.table.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "{}", Self::format_row(HEADERS.iter().map(|h| h.to_string())))?;
        for row in &view.table {
            let cells = [
                format_timestamp(&row.timestamp),
                format!("{:.2}", row.open),
                format!("{:.2}", row.high),
                format!("{:.2}", row.low),
                format!("{:.2}", row.close),
                format_volume(row.volume),
                format_optional(row.rsi, 2),
                format!("{:.2}", row.ema_fast),
                format!("{:.2}", row.ema_slow),
                format!("{:.4}", row.macd),
                format!("{:.4}", row.signal),
            ];
            writeln!(out, "{}", Self::format_row(cells.into_iter()))?;
        }
        Ok(())
    }

    pub fn render(&self, view: &ViewModel) -> Result<String, EngineError> {
        let mut buf = Vec::new();
        self.write_to(view, &mut buf)?;
        String::from_utf8(buf).map_err(|e| EngineError::AnyhowError(e.into()))
    }

    fn format_row(cells: impl Iterator<Item = String>) -> String {
        cells
            .zip(WIDTHS)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Presenter for TerminalPresenter {
    fn present(&self, view: &ViewModel) -> Result<(), EngineError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_to(view, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
