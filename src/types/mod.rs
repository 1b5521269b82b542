pub mod job;

pub use job::{FlagUpdate, JobContext, JobFlag, JobPosting, NewJob};
