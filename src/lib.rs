//! Crime map dashboard for the ten major US cities, 2005-2019.
//!
//! [`CrimeTable`] reshapes the wide per-city snapshot into a long table once at
//! startup; [`render`] turns a dropdown selection into a map [`PlotSpec`];
//! [`server`] serves the page and figures over HTTP.

pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod server;
pub mod visualization;

pub use config::{DashboardConfig, UnmappedCategories};
pub use error::DashboardError;
pub use model::{CrimeTable, Selection};
pub use visualization::{render, MapPoint, MapView, PlotSpec};
