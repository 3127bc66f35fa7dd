//! Wizard step state machine and the per-session validation state.
//!
//! Forward navigation is gated on validation; backward navigation never is.
//! There is no terminal step: finishing is a successful commit on the
//! catalog, which is orthogonal to the step position.

use std::collections::BTreeSet;

use super::draft::{Draft, Field};
use super::validate::{self, FieldErrors};

/// The three wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    /// Title, description, primary photo, listing type.
    Basics,
    /// Category and listing type confirmation.
    Details,
    /// Final review; gates on the full draft.
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[WizardStep::Basics, WizardStep::Details, WizardStep::Review]
    }

    /// 1-based step number for display.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Basics => 1,
            WizardStep::Details => 2,
            WizardStep::Review => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Basics => "Basics",
            WizardStep::Details => "Details",
            WizardStep::Review => "Review",
        }
    }

    fn next(self) -> WizardStep {
        match self {
            WizardStep::Basics => WizardStep::Details,
            WizardStep::Details | WizardStep::Review => WizardStep::Review,
        }
    }

    fn prev(self) -> WizardStep {
        match self {
            WizardStep::Basics | WizardStep::Details => WizardStep::Basics,
            WizardStep::Review => WizardStep::Details,
        }
    }
}

/// Outcome of a navigation attempt. Validation failures are ordinary data
/// here, never panics: they are user-correctable by design.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Navigation happened (or was already at the clamp boundary).
    Moved(WizardStep),
    /// Navigation refused; the offending step and its errors.
    Blocked { step: WizardStep, errors: FieldErrors },
}

impl StepOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked { .. })
    }
}

/// Tracks the current step and gates forward movement on validation.
#[derive(Debug)]
pub struct StepController {
    step: WizardStep,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    pub fn new() -> Self {
        Self { step: WizardStep::Basics }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Validate the current step and move forward if it passes. Clamped at
    /// review: advancing there re-runs full validation but stays put.
    pub fn advance(&mut self, draft: &Draft) -> StepOutcome {
        let errors = validate::validate_step(self.step, draft);
        if errors.is_empty() {
            self.step = self.step.next();
            StepOutcome::Moved(self.step)
        } else {
            StepOutcome::Blocked { step: self.step, errors }
        }
    }

    /// Move back one step. Never validates, clamped at the first step.
    pub fn retreat(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.step
    }

    /// Jump directly to `target`, allowed only when every step strictly
    /// before it validates. On refusal the position is unchanged and the
    /// first failing step's errors come back.
    pub fn jump_to(&mut self, target: WizardStep, draft: &Draft) -> StepOutcome {
        for step in WizardStep::all().iter().copied().filter(|s| *s < target) {
            let errors = validate::validate_step(step, draft);
            if !errors.is_empty() {
                return StepOutcome::Blocked { step, errors };
            }
        }
        self.step = target;
        StepOutcome::Moved(self.step)
    }
}

/// Per-session validation display state: which fields the user has touched
/// and the errors currently on show. Derived from the draft, recomputed for
/// touched fields on every change and wholesale on advance attempts; never
/// persisted.
#[derive(Debug, Default)]
pub struct ValidationState {
    errors: FieldErrors,
    touched: BTreeSet<Field>,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a field touched and revalidate it against the snapshot.
    pub fn touch(&mut self, field: Field, draft: &Draft) {
        self.touched.insert(field);
        match validate::validate_field(field, draft) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Revalidate every touched field (after a change that can affect
    /// several fields at once, e.g. loading a photo).
    pub fn refresh(&mut self, draft: &Draft) {
        let touched: Vec<Field> = self.touched.iter().copied().collect();
        for field in touched {
            self.touch(field, draft);
        }
    }

    /// Replace the visible errors with the result of a step-advance
    /// attempt, marking those fields touched.
    pub fn absorb(&mut self, errors: &FieldErrors) {
        for (field, message) in errors {
            self.touched.insert(*field);
            self.errors.insert(*field, message.clone());
        }
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.touched.clear();
    }
}
