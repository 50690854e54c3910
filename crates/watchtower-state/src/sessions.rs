use std::sync::Arc;

use anyhow::Result;
use watchtower_core::clock::format_ts;
use watchtower_core::id::new_session_id;
use watchtower_core::{Clock, Session, SessionFile, SessionType};
use watchtower_store::{modify, DocStore};

/// One current session slot plus append-only history (`sessions.json`).
#[derive(Clone)]
pub struct SessionTracker {
    doc: Arc<dyn DocStore<SessionFile>>,
    clock: Arc<dyn Clock>,
}

impl SessionTracker {
    pub fn new(doc: Arc<dyn DocStore<SessionFile>>, clock: Arc<dyn Clock>) -> Self {
        Self { doc, clock }
    }

    pub fn current(&self) -> Option<Session> {
        self.doc.load().current_session
    }

    pub fn history(&self) -> Vec<Session> {
        self.doc.load().history
    }

    /// Start a session, archiving whichever one was current.
    pub fn start(
        &self,
        session_type: SessionType,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Session> {
        let now = format_ts(self.clock.now());
        let session = Session {
            id: new_session_id(),
            started_at: now.clone(),
            last_activity: now,
            session_type,
            context,
        };
        let started = session.clone();
        modify(&*self.doc, |file: &mut SessionFile| {
            if let Some(prev) = file.current_session.replace(session) {
                tracing::debug!(session_id = %prev.id, "session archived");
                file.history.push(prev);
            }
        })?;
        Ok(started)
    }

    /// Refresh `last_activity` on the current session.
    pub fn touch(&self) -> Result<Option<Session>> {
        let now = format_ts(self.clock.now());
        modify(&*self.doc, |file: &mut SessionFile| {
            file.current_session.as_mut().map(|s| {
                s.last_activity = now;
                s.clone()
            })
        })
    }

    /// Archive the current session. Returns it, or `None` if there was none.
    pub fn end(&self) -> Result<Option<Session>> {
        modify(&*self.doc, |file: &mut SessionFile| {
            let ended = file.current_session.take()?;
            file.history.push(ended.clone());
            Some(ended)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;
    use watchtower_core::FixedClock;
    use watchtower_store::MemoryDoc;

    fn tracker() -> (SessionTracker, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(datetime!(2026-03-02 07:45 UTC)));
        (
            SessionTracker::new(Arc::new(MemoryDoc::<SessionFile>::new()), clock.clone()),
            clock,
        )
    }

    #[test]
    fn start_archives_previous() {
        let (sessions, _) = tracker();
        let brief = sessions.start(SessionType::Briefing, None).unwrap();
        let card = sessions.start(SessionType::Card, None).unwrap();
        assert_eq!(sessions.current().unwrap().id, card.id);
        let history = sessions.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, brief.id);
    }

    #[test]
    fn end_moves_current_to_history() {
        let (sessions, _) = tracker();
        assert!(sessions.end().unwrap().is_none());
        let s = sessions.start(SessionType::Energy, None).unwrap();
        let ended = sessions.end().unwrap().unwrap();
        assert_eq!(ended.id, s.id);
        assert!(sessions.current().is_none());
        assert_eq!(sessions.history().len(), 1);
    }

    #[test]
    fn touch_refreshes_last_activity() {
        let (sessions, clock) = tracker();
        let mut ctx = serde_json::Map::new();
        ctx.insert("project".into(), serde_json::json!("quarterly report"));
        let s = sessions.start(SessionType::General, Some(ctx)).unwrap();
        clock.advance(Duration::minutes(25));
        let touched = sessions.touch().unwrap().unwrap();
        assert_eq!(touched.started_at, s.started_at);
        assert_ne!(touched.last_activity, s.last_activity);
        assert_eq!(touched.context.unwrap()["project"], "quarterly report");
    }
}
