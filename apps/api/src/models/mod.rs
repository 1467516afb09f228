pub mod calendar;
pub mod entry;
pub mod user;

use serde::{Deserialize, Serialize};

pub use calendar::{Calendar, CalendarRow, CalendarWithOwnerRow};
pub use entry::{Entry, EntryRow, EntryWithCalendarRow, EntryWithOwnerRow};
pub use user::{NewUser, User, UserRow};

/// Response body of methods that return nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}
