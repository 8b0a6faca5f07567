pub mod e2e;
pub mod integration;
pub mod performance;
pub mod unit;

use crate::models::Suite;
use crate::runner::TestCase;

/// The fixed, ordered case list of `suite`.
pub fn cases(suite: Suite) -> Vec<Box<dyn TestCase>> {
    match suite {
        Suite::Unit => unit::cases(),
        Suite::Integration => integration::cases(),
        Suite::EndToEnd => e2e::cases(),
        Suite::Performance => performance::cases(),
    }
}
