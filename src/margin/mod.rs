// 6.0: margin facade. one method per remote operation, split by concern:
// core dispatch, position writes, lender side writes, constant reads, event history.

mod core;
mod history;
mod loans;
mod positions;
mod queries;
mod results;

pub use self::core::Margin;
pub use results::MarginError;
