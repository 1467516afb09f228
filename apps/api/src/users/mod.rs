// User RPCs: sign-in upsert and profile updates.

pub mod handlers;
pub mod service;
