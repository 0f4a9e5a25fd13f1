pub mod accounts;
pub mod notes;

pub use accounts::AccountService;
pub use notes::{NewNote, NoteChanges, NoteService};
