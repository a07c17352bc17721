//! Passes that mutate the IR in place.
mod strip_info;

pub use strip_info::StripInfo;
