pub use super::books::Entity as Books;
pub use super::contact_messages::Entity as ContactMessages;
pub use super::event_registrations::Entity as EventRegistrations;
pub use super::events::Entity as Events;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
