pub mod config;
pub mod error;
pub mod ingest;
pub mod directory;
pub mod registry;
pub mod bridge;
pub mod term;
pub mod mint;
pub mod course;
pub mod graph;
pub mod report;
pub mod pipeline;

pub use config::Config;
pub use error::{CoursegraphError, Result};
pub use course::{course_label, normalize_title, CourseResolver, ResolvedRow};
pub use pipeline::{run, PipelineOptions, Services};
