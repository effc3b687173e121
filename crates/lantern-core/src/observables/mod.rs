pub mod cell;
pub mod latest;
pub mod registry;

pub use cell::{ObservableCell, Subscription};
pub use latest::LatestByKindWithETag;
pub use registry::ObservableRegistry;
