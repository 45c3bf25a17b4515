// Session state: the turn history and where it lives on disk

pub mod moderator_log;
pub mod record;
pub mod store;

pub use moderator_log::{ModeratorLog, ModeratorTurn};
pub use record::{History, TurnRecord};
pub use store::{OpenMode, SessionStore};
