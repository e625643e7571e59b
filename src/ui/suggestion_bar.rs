use std::sync::mpsc::{Receiver, TryRecvError};

use egui::{RichText, Ui};

use crate::model::Task;
use crate::services::{SuggestionClient, SuggestionError};
use crate::ui::theme;

type Pending = Receiver<Result<Task, SuggestionError>>;

/// Prompt text and the request in flight, if any.
#[derive(Default)]
pub struct SuggestionState {
    pub prompt: String,
    pending: Option<Pending>,
    pub last_error: Option<String>,
}

impl SuggestionState {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a request unless one is already running or the prompt is blank.
    pub fn submit(&mut self, client: &SuggestionClient, tasks: &[Task]) -> bool {
        if self.is_busy() || self.prompt.trim().is_empty() {
            return false;
        }
        tracing::info!(endpoint = client.endpoint(), "requesting task suggestion");
        self.last_error = None;
        self.pending = Some(client.spawn(self.prompt.trim().to_string(), tasks.to_vec()));
        true
    }

    /// Non-blocking check for a finished request.
    pub fn poll(&mut self) -> Option<Result<Task, SuggestionError>> {
        let rx = self.pending.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SuggestionError::WorkerStopped),
        };
        self.pending = None;
        match &result {
            Ok(_) => self.prompt.clear(),
            Err(e) => self.last_error = Some(e.to_string()),
        }
        Some(result)
    }

    #[cfg(test)]
    fn with_pending(rx: Pending) -> Self {
        Self {
            prompt: "pending".into(),
            pending: Some(rx),
            last_error: None,
        }
    }
}

/// Render the prompt row. Returns true when the user asked for a suggestion.
pub fn show_suggestion_bar(state: &mut SuggestionState, ui: &mut Ui) -> bool {
    let mut submit = false;
    let busy = state.is_busy();

    ui.horizontal(|ui| {
        ui.label(RichText::new(egui_phosphor::regular::LIGHTBULB).size(14.0).color(theme::ACCENT));
        let edit = ui.add_enabled(
            !busy,
            egui::TextEdit::singleline(&mut state.prompt)
                .hint_text("Describe a task, e.g. \"unit tests for the login flow next week\"")
                .desired_width(ui.available_width() - 110.0),
        );
        let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if busy {
            ui.spinner();
            ui.label(RichText::new("Thinking…").color(theme::TEXT_SECONDARY));
        } else {
            let ask = ui.add_enabled(!state.prompt.trim().is_empty(), egui::Button::new("Suggest"));
            submit = ask.clicked() || enter;
        }
    });

    if let Some(error) = &state.last_error {
        ui.label(RichText::new(error).size(11.0).color(theme::ERROR_TEXT));
    }

    submit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lane;
    use chrono::NaiveDate;
    use std::sync::mpsc;

    #[test]
    fn poll_is_empty_until_worker_answers() {
        let (tx, rx) = mpsc::channel();
        let mut state = SuggestionState::with_pending(rx);
        assert!(state.poll().is_none());
        assert!(state.is_busy());

        let d = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        tx.send(Ok(Task::new("Suggested", Lane::Testing, d, d))).unwrap();

        let task = state.poll().unwrap().unwrap();
        assert_eq!(task.title, "Suggested");
        assert!(!state.is_busy());
        assert!(state.prompt.is_empty());
    }

    #[test]
    fn failure_is_kept_for_display() {
        let (tx, rx) = mpsc::channel();
        let mut state = SuggestionState::with_pending(rx);
        tx.send(Err(SuggestionError::Timeout(10))).unwrap();

        assert!(state.poll().unwrap().is_err());
        assert_eq!(state.prompt, "pending");
        assert!(state.last_error.as_deref().unwrap().contains("10 seconds"));
    }

    #[test]
    fn dropped_worker_is_reported() {
        let (tx, rx) = mpsc::channel::<Result<Task, SuggestionError>>();
        drop(tx);
        let mut state = SuggestionState::with_pending(rx);
        assert!(matches!(state.poll(), Some(Err(SuggestionError::WorkerStopped))));
        assert!(!state.is_busy());
        assert_eq!(
            state.last_error.as_deref(),
            Some("suggestion worker stopped without answering")
        );
    }

    #[test]
    fn blank_prompt_is_not_submitted() {
        let client = SuggestionClient::from_config(&Default::default());
        let mut state = SuggestionState::default();
        state.prompt = "   ".into();
        assert!(!state.submit(&client, &[]));
        assert!(!state.is_busy());
    }
}
