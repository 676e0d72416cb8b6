use std::fmt;

use monitron::models::ClassifiedError;
use prometheus::HistogramVec;

/// A classified failure with caller-chosen codes, shared by the
/// integration suites.
#[derive(Debug)]
pub struct TestError {
    codes: Vec<&'static str>,
}

impl TestError {
    pub fn new(codes: &[&'static str]) -> Self {
        TestError {
            codes: codes.to_vec(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test failure classified as {:?}", self.codes)
    }
}

impl std::error::Error for TestError {}

impl ClassifiedError for TestError {
    fn error_codes(&self) -> Vec<&str> {
        self.codes.clone()
    }
}

/// Sample count and sum for one labeled histogram series.
pub fn histogram_sample(histogram: &HistogramVec, labels: &[&str]) -> (u64, f64) {
    let series = histogram.with_label_values(labels);
    (series.get_sample_count(), series.get_sample_sum())
}
