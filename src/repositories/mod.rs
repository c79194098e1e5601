pub(crate) mod catalog;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod submissions;
pub(crate) mod users;
pub(crate) mod votes;
