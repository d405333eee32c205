//! Booking lifecycle: status machine, storage and service operations.

pub mod models;
pub mod repository;
pub mod responses;
pub mod services;

pub use models::{Booking, BookingStatus, NewBooking, TransitionError};
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use services::{BookingService, BulkBooking};
