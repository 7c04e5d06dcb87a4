pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod query;
pub mod selection;
pub mod source;
pub mod ui;

pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use models::{Project, ProjectStatus, User};
pub use query::{derive, DerivedView, QueryState, SortDirection, SortKey, StatusFilter};
pub use selection::Selection;
