/// Receives the updated score after every counted strike.
pub trait ScoreSink: Send {
    fn publish(&mut self, score: u32);
}

impl<F> ScoreSink for F
where
    F: FnMut(u32) + Send,
{
    fn publish(&mut self, score: u32) {
        self(score)
    }
}

/// Monotonic hit counter plus the optional display sink.
#[derive(Default)]
pub struct ScoreBoard {
    score: u32,
    sink: Option<Box<dyn ScoreSink>>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sink(&mut self, sink: Box<dyn ScoreSink>) {
        self.sink = Some(sink);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Adds one hit and forwards the new total to the sink.
    pub fn record_hit(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        if let Some(sink) = self.sink.as_mut() {
            sink.publish(self.score);
        }
        self.score
    }

    pub fn display_text(&self) -> String {
        format_score(self.score)
    }
}

/// Text shown on the score label.
pub fn format_score(score: u32) -> String {
    format!("Score: {score}")
}

impl std::fmt::Debug for ScoreBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreBoard")
            .field("score", &self.score)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn forwards_every_hit_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut board = ScoreBoard::new();
        let sink_seen = seen.clone();
        board.set_sink(Box::new(move |score: u32| sink_seen.lock().unwrap().push(score)));

        board.record_hit();
        board.record_hit();

        assert_eq!(board.score(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn renders_score_label() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.display_text(), "Score: 0");
        board.record_hit();
        assert_eq!(board.display_text(), "Score: 1");
    }
}
