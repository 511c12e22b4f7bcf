//! User store.

mod users;

pub use users::{UsersRepository, EMAIL_TAKEN};
