// Entry RPCs: day-slot claims within a calendar.

pub mod handlers;
pub mod service;
