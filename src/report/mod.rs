//! The in-progress daily report: model, typed updates and persistence.

pub mod model;
pub mod routes;
pub mod slots;
pub mod store;
pub mod update;


pub use model::Report;
pub use slots::SlotList;
pub use store::ReportStore;
pub use update::{ReportError, ReportUpdate};
