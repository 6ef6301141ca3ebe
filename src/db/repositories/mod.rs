pub mod book;
pub mod contact;
pub mod event;
pub mod registration;
pub mod session;
pub mod user;
