// Domain Layer - Pure business logic and entities

pub mod error;
pub mod geo;
pub mod pricing;
pub mod print_job;
pub mod user;

// Re-exports
pub use error::DomainError;
pub use geo::{haversine_km, rank_shops, Coordinate, RankedShop, ShopLocation, EARTH_RADIUS_KM};
pub use pricing::{compute_cost, UNIT_PRICE};
pub use print_job::{
    ColorMode, JobStatus, NewPrintJob, OwnedJob, PaperSize, PrintJob, PrintJobId, PrintMode,
    PrintType, QueueEntry, RedemptionCode, ShopRef,
};
pub use user::{Identity, NewUser, Role, User, UserId};
