//! Business logic for the booking service.
//!
//! Handlers stay thin; everything between the HTTP boundary and the storage
//! layer lives here.

pub mod booking;

pub use booking::BookingService;
