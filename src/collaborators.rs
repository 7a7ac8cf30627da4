//! Collaborator interfaces (§6): the windowed UI shell drives the engine
//! through these; the engine itself never assumes a particular toolkit.

pub enum ConfirmAnswer {
    Yes,
    No,
    Cancel,
}

pub trait UiCollaborator: Send + Sync {
    fn status(&self, message: &str);
    fn progress(&self, percent: Option<u8>);
    fn prompt_choice(&self, title: &str, prompt: &str, options: &[String]) -> Option<usize>;
    fn prompt_text(&self, title: &str, prompt: &str, default: Option<&str>) -> Option<String>;
    fn confirm(&self, title: &str, message: &str) -> ConfirmAnswer;
    fn notify(&self, title: &str, body: &str, success: bool);
}

/// A CLI-appropriate collaborator: status/progress/notify go to the log;
/// every interactive prompt is refused, since no terminal UI is implemented
/// here. An interactive frontend supplies its own collaborator instead.
pub struct LoggingCollaborator;

impl UiCollaborator for LoggingCollaborator {
    fn status(&self, message: &str) {
        log::info!("{message}");
    }

    fn progress(&self, percent: Option<u8>) {
        match percent {
            Some(p) => log::debug!("progress: {p}%"),
            None => log::debug!("progress: indeterminate"),
        }
    }

    fn prompt_choice(&self, _title: &str, _prompt: &str, _options: &[String]) -> Option<usize> {
        None
    }

    fn prompt_text(&self, _title: &str, _prompt: &str, _default: Option<&str>) -> Option<String> {
        None
    }

    fn confirm(&self, _title: &str, _message: &str) -> ConfirmAnswer {
        ConfirmAnswer::Cancel
    }

    fn notify(&self, title: &str, body: &str, success: bool) {
        if success {
            log::info!("[{title}] {body}");
        } else {
            log::warn!("[{title}] {body}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_collaborator_refuses_every_prompt() {
        let collaborator = LoggingCollaborator;
        assert!(collaborator.prompt_choice("t", "p", &[]).is_none());
        assert!(collaborator.prompt_text("t", "p", None).is_none());
        assert!(matches!(collaborator.confirm("t", "m"), ConfirmAnswer::Cancel));
    }
}
