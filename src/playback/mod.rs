pub(crate) mod audio;
pub(crate) mod cursor;
pub(crate) mod scheduler;
