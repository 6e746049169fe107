/// Sink for unexpected failures caught at tick and lifecycle boundaries
pub trait Diagnostics: Send + Sync {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &[(&str, String)]);
}
