// Dashboard configuration: embedded defaults, optional JSON file, environment overrides.
pub mod settings;

pub use settings::{
    ChartColors, ChartSettings, DashboardSettings, DataSettings, DataSourceKind, SelectionDefaults,
};
