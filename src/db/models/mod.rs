mod booking;
mod client;
mod holiday;
mod status;

pub use booking::{Booking, BookingDetails, BookingInput, BookingStatusRow};
pub use client::{Client, ClientInput};
pub use holiday::{Holiday, HolidayInput, HolidayKind};
pub use status::{Status, StatusInput};
