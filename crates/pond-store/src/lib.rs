pub mod database;
pub mod error;
pub mod messages;
pub mod partners;
pub mod schema;
pub mod source;

pub use database::Database;
pub use error::StoreError;
pub use messages::MessageRepo;
pub use partners::{PartnerRepo, PartnerRow};
pub use source::SqliteLogSource;
