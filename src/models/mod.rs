pub mod grid;
pub mod session;
pub mod week;

pub use grid::{GridRow, ScheduleWeek, organize};
pub use session::{ClassSession, ClassStatus, SchoolDay};
pub use week::IsoWeek;
