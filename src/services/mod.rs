pub mod reservation;
pub use reservation::{
    CancelIdentity, CancellationOutcome, MAX_GUESTS, MIN_GUESTS, ReservationError,
    ReservationOutcome, ReservationRequest, ReservationService,
};

pub mod reservation_impl;
pub use reservation_impl::SeaOrmReservationService;

pub mod mailer;
pub use mailer::Mailer;
