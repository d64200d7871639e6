//! Theme state machine.
//!
//! The platform theme is a two-state switch the application can only flip.
//! [`toggle_plan`] decides how many flips reach a target; [`drive_to`] issues
//! them against a [`ThemeToggle`].
//!
//! With [`ThemeStrategy::AssumeLight`] the plan is fixed: dark takes one flip,
//! light takes two (flip to dark, flip back). That is only correct when the
//! switch really starts light. If the toggle owner persisted its own state
//! across launches the plan lands on the wrong theme, which [`drive_to`]
//! detects from the state the last flip reports and logs.
//! [`ThemeStrategy::QueryFirst`] reads the current state and flips at most once.

use crate::core::config::ThemeStrategy;
use crate::core::error::CollaboratorError;
use crate::session::registry::ThemeMode;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeState {
    Light,
    Dark,
}

impl ThemeState {
    pub const fn from_is_dark(is_dark: bool) -> Self {
        if is_dark {
            ThemeState::Dark
        } else {
            ThemeState::Light
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            ThemeState::Light => ThemeState::Dark,
            ThemeState::Dark => ThemeState::Light,
        }
    }

    /// The state a persisted mode asks for; `System` asks for nothing.
    pub const fn target_for(mode: ThemeMode) -> Option<ThemeState> {
        match mode {
            ThemeMode::System => None,
            ThemeMode::Light => Some(ThemeState::Light),
            ThemeMode::Dark => Some(ThemeState::Dark),
        }
    }
}

/// What the toggle owner reports about the live theme.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThemeInfo {
    pub is_dark: bool,
    pub source: String,
}

/// External theme owner.
#[async_trait]
pub trait ThemeToggle: Send + Sync {
    /// Flip the theme. Returns whether the theme is dark afterwards.
    async fn toggle_once(&self) -> Result<bool, CollaboratorError>;

    async fn theme_info(&self) -> Result<ThemeInfo, CollaboratorError>;
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ThemeOutcome {
    pub target: ThemeState,
    pub toggles: usize,
    /// Last state reported by the toggle owner, if any call reported one.
    pub final_state: Option<ThemeState>,
}

impl ThemeOutcome {
    pub fn reached_target(&self) -> bool {
        self.final_state == Some(self.target)
    }
}

/// Number of flips needed to reach `target`.
///
/// `observed` is only consulted by `QueryFirst`; without it the fixed plan applies.
pub fn toggle_plan(
    target: ThemeState,
    strategy: ThemeStrategy,
    observed: Option<ThemeState>,
) -> usize {
    match (strategy, observed) {
        (ThemeStrategy::QueryFirst, Some(current)) => usize::from(current != target),
        _ => match target {
            ThemeState::Dark => 1,
            ThemeState::Light => 2,
        },
    }
}

/// Issue the planned flips. Stops at the first toggle failure.
pub async fn drive_to(
    toggle: &dyn ThemeToggle,
    target: ThemeState,
    strategy: ThemeStrategy,
) -> Result<ThemeOutcome, CollaboratorError> {
    let observed = match strategy {
        ThemeStrategy::QueryFirst => {
            let info = toggle.theme_info().await?;
            debug!("theme owner reports dark={} source={}", info.is_dark, info.source);
            Some(ThemeState::from_is_dark(info.is_dark))
        }
        ThemeStrategy::AssumeLight => None,
    };

    let planned = toggle_plan(target, strategy, observed);
    let mut final_state = observed;
    for _ in 0..planned {
        final_state = Some(ThemeState::from_is_dark(toggle.toggle_once().await?));
    }

    let outcome = ThemeOutcome {
        target,
        toggles: planned,
        final_state,
    };
    if let Some(reached) = outcome.final_state.filter(|s| *s != target) {
        warn!(
            "theme restore issued {} toggle(s) for {:?} but ended {:?}",
            planned, target, reached
        );
    }
    Ok(outcome)
}

/// In-process theme owner. Starts at a chosen state and counts flips.
#[derive(Debug)]
pub struct SimulatedToggle {
    state: Mutex<ThemeState>,
    source: String,
    calls: AtomicUsize,
}

impl SimulatedToggle {
    pub fn new(initial: ThemeState) -> Self {
        Self {
            state: Mutex::new(initial),
            source: "system".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn toggle_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> ThemeState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(ThemeState::Light)
    }
}

impl Default for SimulatedToggle {
    fn default() -> Self {
        Self::new(ThemeState::Light)
    }
}

#[async_trait]
impl ThemeToggle for SimulatedToggle {
    async fn toggle_once(&self) -> Result<bool, CollaboratorError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CollaboratorError::Toggle("simulated toggle poisoned".to_string()))?;
        *state = state.flipped();
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*state == ThemeState::Dark)
    }

    async fn theme_info(&self) -> Result<ThemeInfo, CollaboratorError> {
        Ok(ThemeInfo {
            is_dark: self.current() == ThemeState::Dark,
            source: self.source.clone(),
        })
    }
}
