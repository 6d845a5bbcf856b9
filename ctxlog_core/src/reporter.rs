//! Error-reporting client held by the logger.
//!
//! The logger keeps a reporter so callers can reach it through
//! [`ContextLogger::reporter`](crate::ContextLogger::reporter), but no
//! logging call sends reports through it.

use crate::{Field, Level};

/// Client that forwards alert-style reports to a monitoring service
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str, fields: &[Field]);
}
