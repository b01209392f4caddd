pub(crate) mod canvas;
pub(crate) mod display;
pub(crate) mod thread;
