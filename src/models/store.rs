use super::result::TestResult;
use super::status::TestStatus;

/// Append-only, insertion-ordered collection of finalized results for one run.
///
/// Results can be added but never mutated or removed; readers only get shared
/// references.
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    results: Vec<TestResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn as_slice(&self) -> &[TestResult] {
        &self.results
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }
}

impl FromIterator<TestResult> for ResultStore {
    fn from_iter<I: IntoIterator<Item = TestResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
