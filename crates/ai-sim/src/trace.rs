use std::io::Write;

use ai_tools::{TraceEvent, TraceSink};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct Line<'a> {
    agent: u64,
    event: &'a TraceEvent,
}

/// Writes one JSON object per trace event, tagged with the agent id.
#[derive(Debug)]
pub struct JsonLinesSink<O: Write> {
    agent: u64,
    out: O,
    failed: bool,
}

impl<O: Write> JsonLinesSink<O> {
    pub fn new(agent: u64, out: O) -> Self {
        Self {
            agent,
            out,
            failed: false,
        }
    }

    pub fn into_inner(self) -> O {
        self.out
    }

    fn write(&mut self, event: &TraceEvent) -> anyhow::Result<()> {
        let line = Line {
            agent: self.agent,
            event,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<O: Write> TraceSink for JsonLinesSink<O> {
    fn emit(&mut self, event: TraceEvent) {
        // Only the first failure is reported.
        if let Err(err) = self.write(&event) {
            if !self.failed {
                warn!(agent = self.agent, error = %err, "trace output failed");
                self.failed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_tools::tags;

    #[test]
    fn one_line_per_event() {
        let mut sink = JsonLinesSink::new(7, Vec::new());
        sink.emit(TraceEvent::new(3, tags::STATE).with_a(1).with_b(2));
        sink.emit(TraceEvent::new(4, tags::PHASE).with_detail("enraged"));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["agent"], 7);
        assert_eq!(lines[0]["event"]["tag"], "ai.state");
        assert_eq!(lines[1]["event"]["detail"], "enraged");
    }
}
