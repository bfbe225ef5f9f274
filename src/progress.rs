//! Progress reporting
//!
//! Long transformations report how far along they are through an optional
//! sink, so the algorithms themselves stay free of any UI concerns.

/// Receives progress updates as `(stage, fraction)` with fraction in [0, 1]
pub trait ProgressSink {
    fn report(&mut self, stage: &str, fraction: f32);
}

impl<F> ProgressSink for F
where
    F: FnMut(&str, f32),
{
    fn report(&mut self, stage: &str, fraction: f32) {
        self(stage, fraction)
    }
}

/// Sink that discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _stage: &str, _fraction: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink_receives_updates() {
        let mut seen = Vec::new();
        {
            let mut sink = |stage: &str, fraction: f32| seen.push((stage.to_string(), fraction));
            sink.report("normalize", 0.5);
            sink.report("normalize", 1.0);
        }
        assert_eq!(
            seen,
            vec![("normalize".to_string(), 0.5), ("normalize".to_string(), 1.0)]
        );
    }
}
