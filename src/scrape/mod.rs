pub mod job;
pub mod normalize;
pub mod platform;
pub mod types;

pub use job::JobProxy;
pub use platform::{ApifyPlatform, ScrapePlatform};
pub use types::{JobHandle, JobRequest, JobStatus, ResultItem, StandingRow};
