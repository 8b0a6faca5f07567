pub mod result;
pub mod status;
pub mod store;
pub mod suite;

pub use result::{Outcome, TestResult};
pub use status::TestStatus;
pub use store::ResultStore;
pub use suite::Suite;
