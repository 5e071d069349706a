// JSON dump of the view model, for feeding an external chart front-end
use super::Presenter;
use crate::error::EngineError;
use crate::pipeline::ViewModel;
use std::io::Write;
use std::path::PathBuf;

/// Writes the view model as pretty JSON to `path`, or to stdout when no path is set.
#[derive(Debug, Clone, Default)]
pub struct JsonPresenter {
    path: Option<PathBuf>,
}

impl JsonPresenter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn render(&self, view: &ViewModel) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(view)?)
    }
}

impl Presenter for JsonPresenter {
    fn present(&self, view: &ViewModel) -> Result<(), EngineError> {
        let json = self.render(view)?;
        match &self.path {
            Some(path) => {
                std::fs::write(path, json)?;
                tracing::info!(path = %path.display(), "Wrote JSON view model");
            }
            None => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{}", json)?;
            }
        }
        Ok(())
    }
}
