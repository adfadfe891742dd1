//! Run state and progress tracking.
//!
//! A generation run is strictly linear: not started, negotiating, generating,
//! then complete or failed. [`RunContext`] carries that state together with
//! the progress shown to the user, and is passed explicitly through a run.

use crate::error::{LearnPathError, Result};
use serde::Serialize;

/// Receiver of human-readable progress notifications.
///
/// Notifications are advisory; nothing may depend on them for control flow.
pub trait ProgressSink: Send {
    fn notify(&mut self, message: &str);

    /// Called instead of [`notify`](Self::notify) when a [`RunContext`] has
    /// mapped the message to a section and fraction.
    fn update(&mut self, message: &str, update: ProgressUpdate) {
        let _ = update;
        self.notify(message);
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(&str) + Send,
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Sink that drops every notification.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&mut self, _message: &str) {}
}

/// Lifecycle of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotStarted,
    Negotiating,
    Generating,
    Complete,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed)
    }

    fn can_advance_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::NotStarted, RunState::Negotiating)
                | (RunState::Negotiating, RunState::Generating)
                | (RunState::Generating, RunState::Complete)
                | (RunState::Negotiating, RunState::Failed)
                | (RunState::Generating, RunState::Failed)
        )
    }
}

/// Progress section a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Setup,
    Integration,
    Tools,
    Mode,
    Generation,
    Complete,
    Progress,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Setup => "Setup",
            Section::Integration => "Integration",
            Section::Tools => "Tools",
            Section::Mode => "Mode",
            Section::Generation => "Generation",
            Section::Complete => "Complete",
            Section::Progress => "Progress",
        };
        write!(f, "{}", name)
    }
}

/// What changed after a progress message was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub section: Section,
    pub fraction: f32,
    /// True when the message opened a new section.
    pub section_changed: bool,
}

/// Explicit per-run context: state machine plus displayed progress.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunContext {
    state: RunState,
    current_step: String,
    progress: f32,
    last_section: Option<Section>,
    is_generating: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    /// Progress fraction in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn last_section(&self) -> Option<Section> {
        self.last_section
    }

    /// Whether a run is in flight; callers disable their trigger while true.
    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    /// Move to the next state. Skipping or reversing states is rejected.
    pub fn advance(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(LearnPathError::InvalidInput(format!(
                "cannot move run from {:?} to {:?}",
                self.state, next
            )));
        }
        self.state = next;
        match next {
            RunState::Negotiating => {
                self.is_generating = true;
                self.current_step.clear();
                self.progress = 0.0;
                self.last_section = None;
            }
            RunState::Complete | RunState::Failed => self.is_generating = false,
            _ => {}
        }
        Ok(())
    }

    /// Record a progress message and map it to a section and fraction.
    pub fn record(&mut self, message: &str) -> ProgressUpdate {
        self.current_step = message.to_string();

        let mapped = if message.contains("Setting up agent with tools") {
            Some((Section::Setup, 0.1))
        } else if message.contains("Added Google Drive integration")
            || message.contains("Added Notion integration")
        {
            Some((Section::Integration, 0.2))
        } else if message.contains("Creating AI agent") {
            Some((Section::Setup, 0.3))
        } else if message.contains("Available tools") {
            Some((Section::Tools, 0.4))
        } else if message.contains("Using full learning path generation")
            || message.contains("Using YouTube-only learning path generation")
        {
            Some((Section::Mode, 0.5))
        } else if message.contains("Generating your learning path") {
            Some((Section::Generation, 0.6))
        } else if message.contains("Learning path generation complete") {
            Some((Section::Complete, 1.0))
        } else {
            None
        };

        let section = match mapped {
            Some((section, fraction)) => {
                self.progress = fraction;
                if section == Section::Complete {
                    self.is_generating = false;
                }
                section
            }
            None => self.last_section.unwrap_or(Section::Progress),
        };

        let section_changed = self.last_section != Some(section);
        self.last_section = Some(section);

        ProgressUpdate {
            section,
            fraction: self.progress,
            section_changed,
        }
    }
}
