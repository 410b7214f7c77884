// Service exports
pub mod appwrite;
pub mod quota;
pub mod routing;
pub mod vision;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use quota::ClassificationQuota;
pub use routing::{RouteSummary, RoutingClient, RoutingError};
pub use vision::{VisionClient, VISION_VERSION};
