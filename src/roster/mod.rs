//! Teacher-name roster: the names offered by every name picker in the form.

pub mod model;
pub mod routes;
pub mod store;


pub use model::{normalize_name, Roster};
pub use store::{load_defaults, RosterError, RosterStore};
