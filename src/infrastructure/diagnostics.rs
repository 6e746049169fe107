//! Default diagnostics sink

use crate::domain::traits::Diagnostics;

/// Reports failures as `error!` events with the context attached
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &[(&str, String)]) {
        let context = context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");

        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        tracing::error!(error = %error, causes = ?causes, context = %context, "Unexpected failure");
    }
}
