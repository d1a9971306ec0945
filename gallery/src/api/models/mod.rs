//! Response data models.

pub mod uploads;
