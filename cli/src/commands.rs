pub mod district;
pub mod markers;
