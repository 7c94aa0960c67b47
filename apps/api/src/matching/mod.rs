// Resume and job matching: text extraction from uploads and skill-overlap scoring.

pub mod extractor;
pub mod handlers;
pub mod skills;
