//! Backend bridge: the command queue and the worker thread that owns the view.

pub mod commands;
pub mod runtime;
