// Library exports for hitselect
pub mod blast_tabular;
pub mod cluster;
pub mod config;
pub mod error;
pub mod filter;
pub mod hit;
pub mod kma;
pub mod mapping;
pub mod overlap;
pub mod report;
pub mod selection;
pub mod statistics;
pub mod subject;
pub mod union_find;

pub use config::{SelectionConfig, SelectionMode};
pub use error::{HitError, Result};
pub use hit::{BlastHit, HitClass, HitRecord, HitStatistics, Metadata, QueryAligned};
pub use kma::{KmaHit, KmaStatistics};
pub use statistics::AlignmentStatistics;
pub use subject::{SubjectId, SubjectIdentity};
