pub mod grading_flow;
pub mod topic_flow;

pub use grading_flow::{GradeOutcome, GradingFlow};
pub use topic_flow::TopicFlow;
