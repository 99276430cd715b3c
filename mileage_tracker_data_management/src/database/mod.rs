pub mod constants;
pub mod db;

pub use db::MileageDatabase;
