//! Request and response models for the analysis API.

mod request;
mod response;

pub use request::{
    AnalyzeRequest, AnomalyRequest, ClassifyRequest, ExtractRequest, SearchCandidate,
    SearchRequest, SummarizeRequest,
};
pub use response::{
    AnalysisReport, AnomalyFinding, ApiResponse, Classification, DocumentCategory, Entity,
    EntityExtraction, OcrOutcome, SearchHit, SearchOutcome, Severity, Summarization,
};
