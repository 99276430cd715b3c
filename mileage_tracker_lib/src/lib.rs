pub mod distance_table;
pub mod ledger;
pub mod reimbursement;
pub mod report;
pub mod route;
pub mod trip;
pub mod user;

pub use distance_table::{DistanceTable, DistanceTableError};
pub use ledger::{Ledger, LedgerError, LedgerState, LedgerSummary};
pub use reimbursement::{InvalidRate, ReimbursementRate};
pub use report::{Cell, Report, ReportRow};
pub use route::Route;
pub use trip::{NewTrip, Trip};
pub use user::User;
