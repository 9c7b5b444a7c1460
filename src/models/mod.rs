pub mod requests;
pub mod task;

pub use requests::{
    parse_body, ConceptMapRequest, CreativityRequest, GradingRequest, JustificationRequest,
    LexicalRequest, StoryRequest, TopicRequest, TopicResponse,
};
pub use task::{FieldSpec, FormulaSpec, GradingTask};
