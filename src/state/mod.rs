pub mod cursor;
pub mod dedup;
pub mod observer;
