pub mod prelude;

pub mod books;
pub mod contact_messages;
pub mod event_registrations;
pub mod events;
pub mod sessions;
pub mod users;
