//! UI layer for desktop GUI: app shell, roster table, drawer, and toasts.

pub mod app;

pub use app::{StartupConfig, StudentAdminApp};
