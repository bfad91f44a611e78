//! URL-synchronized data table state
//!
//! Keeps a data table's sorting, column filters, global search and
//! pagination in the query string of the current location, so that a table
//! view can be linked, bookmarked and navigated with back/forward.

pub mod boundary;
pub mod codec;
pub mod controller;
pub mod error;
pub mod input;
pub mod router;
pub mod session;
pub mod state;

pub use codec::UrlStateCodec;
pub use controller::TableController;
pub use session::TableSession;
pub use state::TableState;
