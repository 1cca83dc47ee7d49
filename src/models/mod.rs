pub mod booking;
pub mod event;
pub mod ticket;

pub use booking::{Booking, BookingStatus, BookingWithEvent, NewBooking};
pub use event::EventRecord;
pub use ticket::{CapacitySnapshot, Ticket};
