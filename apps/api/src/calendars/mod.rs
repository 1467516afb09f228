// Calendar RPCs: listing, lookup with entries, and owner-scoped mutations.

pub mod handlers;
pub mod service;
