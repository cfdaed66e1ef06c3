// Builder for vote batches used across the test suite.

use crate::modules::scores::core::vote::{Choice, Vote, VoteBatch};

#[derive(Default)]
pub struct VoteBatchBuilder {
    votes: Vec<Vote>,
}

impl VoteBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(mut self, item: impl Into<String>) -> Self {
        self.votes.push(Vote::new(item, Choice::Left));
        self
    }

    pub fn right(mut self, item: impl Into<String>) -> Self {
        self.votes.push(Vote::new(item, Choice::Right));
        self
    }

    pub fn build(self) -> VoteBatch {
        VoteBatch::new(self.votes).expect("fixture batch must be valid")
    }

    /// Request body for `POST /scores`.
    pub fn to_body(&self) -> String {
        serde_json::json!({ "votes": self.votes }).to_string()
    }
}

#[cfg(test)]
mod vote_batch_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_render_the_submission_body() {
        let builder = VoteBatchBuilder::new().left("cat").right("dog");
        let body: serde_json::Value = serde_json::from_str(&builder.to_body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"votes": [
                {"item": "cat", "choice": "left"},
                {"item": "dog", "choice": "right"},
            ]})
        );
        assert_eq!(builder.build().len(), 2);
    }
}
