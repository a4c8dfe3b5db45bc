//! Rating prompt bookkeeping
//!
//! Each unrated meeting opens the rating modal at most once per browser
//! session; dismissed prompts come back only in a new session.

use std::sync::Arc;

use pairing_core::{read_json, write_json, DomainResult, MeetingEvent, SessionStorage};
use uuid::Uuid;

use super::keys;

#[derive(Clone)]
pub struct RatingPromptTracker {
    storage: Arc<dyn SessionStorage>,
}

impl RatingPromptTracker {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    fn prompted(&self) -> DomainResult<Vec<Uuid>> {
        Ok(read_json(self.storage.as_ref(), keys::RATING_PROMPTED_MEETINGS)?.unwrap_or_default())
    }

    pub fn was_prompted(&self, meeting_id: Uuid) -> DomainResult<bool> {
        Ok(self.prompted()?.contains(&meeting_id))
    }

    /// First meeting not prompted yet in this session; recorded as prompted
    pub fn next_prompt<'a>(
        &self,
        unrated: &'a [MeetingEvent],
    ) -> DomainResult<Option<&'a MeetingEvent>> {
        let mut prompted = self.prompted()?;
        let Some(next) = unrated.iter().find(|m| !prompted.contains(&m.id)) else {
            return Ok(None);
        };
        prompted.push(next.id);
        write_json(self.storage.as_ref(), keys::RATING_PROMPTED_MEETINGS, &prompted)?;
        Ok(Some(next))
    }
}
