//! Interactive play through a story.

use fable_core::{Bookmark, Part, State, Story};

use crate::config::ResolverConfig;
use crate::error::{EngineError, EngineResult};
use crate::resolver::{NextResult, Resolver};

/// A way out of the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Label shown to the player.
    pub text: String,
    /// Target section id without `#`.
    pub target: String,
}

/// Links and navigations among `parts`, in order.
pub fn choices_of(parts: &[Part]) -> Vec<Choice> {
    parts
        .iter()
        .filter_map(|part| {
            let (text, target) = part.link_text().zip(part.link_target())?;
            Some(Choice {
                text: text.to_string(),
                target: target.to_string(),
            })
        })
        .collect()
}

/// A player's walk through a story.
///
/// Holds the section the player entered last together with the state they
/// entered it with, so that a [`Bookmark`] replays the same screen.
pub struct PlaySession {
    story: Story,
    resolver: Resolver,
    section_id: Option<String>,
    entry_state: State,
    screen: NextResult,
}

impl PlaySession {
    /// Create a session that has not entered any section yet.
    pub fn new(story: Story, config: ResolverConfig) -> Self {
        Self {
            story,
            resolver: Resolver::new(config),
            section_id: None,
            entry_state: State::new(),
            screen: NextResult {
                section: None,
                parts: Vec::new(),
                state: State::new(),
                narration: String::new(),
            },
        }
    }

    /// Create a session positioned at a bookmark.
    pub fn from_bookmark(story: Story, config: ResolverConfig, bookmark: &Bookmark) -> EngineResult<Self> {
        let mut session = Self::new(story, config);
        session.enter(&bookmark.section_id, bookmark.state.clone())?;
        Ok(session)
    }

    /// Enter `section_id`, or the first section when `None`, with empty state.
    pub fn start(&mut self, section_id: Option<&str>) -> EngineResult<&NextResult> {
        let id = match section_id {
            Some(id) => id.trim_start_matches('#').to_string(),
            None => self
                .story
                .sections
                .first()
                .map(|s| s.id.clone())
                .ok_or(EngineError::EmptyStory)?,
        };
        self.enter(&id, State::new())?;
        Ok(&self.screen)
    }

    fn enter(&mut self, section_id: &str, state: State) -> EngineResult<()> {
        if self.story.section(section_id).is_none() {
            return Err(EngineError::SectionNotFound(section_id.to_string()));
        }
        tracing::debug!(section = section_id, "entering section");
        self.screen = self.resolver.resolve_next(&self.story, section_id, &state);
        self.section_id = Some(section_id.to_string());
        self.entry_state = state;
        Ok(())
    }

    /// Follow the choice at `index` on the current screen.
    pub fn choose(&mut self, index: usize) -> EngineResult<&NextResult> {
        let choices = self.choices();
        let choice = choices.get(index).ok_or(EngineError::InvalidChoice {
            index,
            available: choices.len(),
        })?;
        let state = self.screen.state.clone();
        self.enter(&choice.target, state)?;
        Ok(&self.screen)
    }

    /// Links and navigations on the current screen, in order.
    pub fn choices(&self) -> Vec<Choice> {
        choices_of(&self.screen.parts)
    }

    /// Whether the current screen offers no way on.
    pub fn finished(&self) -> bool {
        self.choices().is_empty()
    }

    /// The current screen.
    pub fn screen(&self) -> &NextResult {
        &self.screen
    }

    /// State after the current screen.
    pub fn state(&self) -> &State {
        &self.screen.state
    }

    /// The story being played.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Bookmark of the section last entered, `None` before [`PlaySession::start`].
    pub fn bookmark(&self) -> Option<Bookmark> {
        self.section_id
            .as_ref()
            .map(|id| Bookmark::new(id.clone(), self.entry_state.clone()))
    }
}
