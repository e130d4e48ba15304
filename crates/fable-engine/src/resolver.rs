//! Section resolution: from a section and a state to a renderable screen.

use std::collections::HashSet;

use fable_core::{Condition, FlatState, Paragraph, Part, Section, State, Story, flatten, unflatten};
use fable_mechanics::{evaluate_action, evaluate_condition, substitute};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{CyclePolicy, ResolverConfig};

/// One resolved section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult {
    /// Parts to render, with variables substituted and audit texts set.
    pub parts: Vec<Part>,
    /// State after every action ran, without the settings keys.
    pub state: State,
    /// Paragraph texts for a narrator.
    pub narration: String,
}

/// A resolved screen, possibly spanning several auto-advanced sections.
#[derive(Debug, Clone, PartialEq)]
pub struct NextResult {
    /// The requested section, `None` when it does not exist or the depth
    /// budget was already spent.
    pub section: Option<Section>,
    /// Parts of every section visited, minus the links that were followed.
    pub parts: Vec<Part>,
    /// State after the last section visited.
    pub state: State,
    /// Paragraph texts for a narrator.
    pub narration: String,
}

impl NextResult {
    fn terminal(state: &State) -> Self {
        Self {
            section: None,
            parts: Vec::new(),
            state: state.clone(),
            narration: String::new(),
        }
    }
}

/// Paragraph texts of `parts`, space-joined in order.
pub fn narration(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Paragraph(paragraph) => Some(paragraph.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Evaluates sections against a state. Owns the dice RNG.
pub struct Resolver {
    config: ResolverConfig,
    rng: StdRng,
}

impl Resolver {
    /// Create a resolver, seeding the RNG from the config or the OS.
    pub fn new(config: ResolverConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a single section.
    ///
    /// `settings` are laid under `state` while resolving and removed from the
    /// resulting state again, key by flattened key.
    pub fn resolve_section(&mut self, section: &Section, state: &State, settings: &State) -> SectionResult {
        let settings = flatten(settings);
        let mut working = settings.clone();
        working.overlay(&flatten(state));

        let mut parts = Vec::new();
        for part in &section.parts {
            self.resolve_part(part, &mut working, &mut parts);
        }

        let kept: FlatState = working
            .into_iter()
            .filter(|(key, _)| !settings.contains_key(key))
            .collect();
        tracing::debug!(section = %section.id, parts = parts.len(), "resolved section");

        SectionResult {
            narration: narration(&parts),
            parts,
            state: unflatten(&kept),
        }
    }

    fn resolve_part(&mut self, part: &Part, working: &mut FlatState, out: &mut Vec<Part>) {
        match part {
            Part::Comment(_) => {}
            Part::Paragraph(paragraph) => out.push(Part::Paragraph(Paragraph {
                text: substitute(&paragraph.text, working),
                variant: paragraph.variant,
            })),
            Part::Action(action) => {
                let outcome = evaluate_action(action, working, &mut self.rng);
                out.push(Part::Action(outcome.render(action)));
                *working = outcome.state;
            }
            Part::Condition(condition) => {
                let outcome = evaluate_condition(&condition.condition, working, &mut self.rng);
                tracing::trace!(audit = %outcome.text, "condition");
                out.push(Part::Condition(Condition {
                    text: Some(outcome.text),
                    ..condition.clone()
                }));
                let branch = if outcome.is_true {
                    &condition.when_true
                } else {
                    &condition.when_false
                };
                for part in branch {
                    self.resolve_part(part, working, out);
                }
            }
            Part::Header(_) | Part::Image(_) | Part::Link(_) | Part::Navigation(_) => {
                out.push(part.clone());
            }
        }
    }

    /// Resolve `section_id`, following single links.
    ///
    /// A section whose resolved parts hold exactly one link or navigation is
    /// merged with the section it points to, up to `max_depth` sections.
    pub fn resolve_next(&mut self, story: &Story, section_id: &str, state: &State) -> NextResult {
        let mut visited = HashSet::new();
        let depth = self.config.max_depth;
        self.follow(story, section_id, state, depth, &mut visited)
    }

    fn follow(
        &mut self,
        story: &Story,
        section_id: &str,
        state: &State,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> NextResult {
        if depth == 0 {
            tracing::debug!(section = section_id, "depth budget exhausted");
            return NextResult::terminal(state);
        }
        let Some(section) = story.section(section_id) else {
            tracing::debug!(section = section_id, "section not found");
            return NextResult::terminal(state);
        };
        visited.insert(section.id.clone());

        let resolved = self.resolve_section(section, state, &story.settings.state);
        let single_target = {
            let mut links = resolved.parts.iter().filter(|p| p.is_link());
            match (links.next(), links.next()) {
                (Some(link), None) => link.link_target().map(str::to_string),
                _ => None,
            }
        };

        let Some(target) = single_target else {
            return NextResult {
                section: Some(section.clone()),
                parts: resolved.parts,
                state: resolved.state,
                narration: resolved.narration,
            };
        };

        if self.config.cycle_policy == CyclePolicy::RejectRevisits && visited.contains(&target) {
            tracing::debug!(from = %section.id, to = %target, "not revisiting section");
            return NextResult {
                section: Some(section.clone()),
                parts: resolved.parts,
                state: resolved.state,
                narration: resolved.narration,
            };
        }

        tracing::trace!(from = %section.id, to = %target, depth, "following single link");
        let followed = self.follow(story, &target, &resolved.state, depth - 1, visited);
        let mut parts: Vec<Part> = resolved.parts.into_iter().filter(|p| !p.is_link()).collect();
        parts.extend(followed.parts);

        NextResult {
            section: Some(section.clone()),
            narration: narration(&parts),
            parts,
            state: followed.state,
        }
    }
}
