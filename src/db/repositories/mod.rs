pub mod bookings;
pub mod clients;
pub mod holidays;
pub mod statuses;

pub use bookings::BookingRepository;
pub use clients::ClientRepository;
pub use holidays::HolidayRepository;
pub use statuses::StatusRepository;
