//! Client-side query flow: debounced search input, guarded refreshes and the
//! controller tying them to the filter engine.

pub mod controller;
pub mod debounce;
pub mod refresh;

pub use controller::{QueryConfig, QueryController, DEFAULT_DEBOUNCE};
pub use debounce::Debouncer;
pub use refresh::{RefreshGuard, RefreshTicket};
