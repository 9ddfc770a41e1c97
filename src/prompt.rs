use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use log::warn;
use std::collections::VecDeque;

/// Blocking user interaction used by the settings and magnet flows
///
/// A dismissed or failed prompt is reported as `None` (or `false`).
pub trait Prompter {
    /// Masked input
    fn ask_secret(&mut self, title: &str, prompt: &str) -> Option<String>;

    fn ask_text(&mut self, title: &str, prompt: &str, initial: &str) -> Option<String>;

    fn confirm(&mut self, title: &str, question: &str) -> bool;

    /// Index of the chosen option
    fn choose(&mut self, title: &str, prompt: &str, options: &[&str]) -> Option<usize>;

    fn info(&mut self, title: &str, message: &str);

    fn error(&mut self, title: &str, message: &str);
}

/// Interactive prompts on the controlling terminal
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn ask_secret(&mut self, title: &str, prompt: &str) -> Option<String> {
        Password::with_theme(&self.theme)
            .with_prompt(format!("{title}: {prompt}"))
            .allow_empty_password(true)
            .interact()
            .inspect_err(|err| warn!("{title} prompt failed: {err}"))
            .ok()
    }

    fn ask_text(&mut self, title: &str, prompt: &str, initial: &str) -> Option<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{title}: {prompt}"))
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .inspect_err(|err| warn!("{title} prompt failed: {err}"))
            .ok()
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(format!("{title}: {question}"))
            .default(false)
            .interact_opt()
            .inspect_err(|err| warn!("{title} prompt failed: {err}"))
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    fn choose(&mut self, title: &str, prompt: &str, options: &[&str]) -> Option<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(format!("{title}: {prompt}"))
            .items(options)
            .default(0)
            .interact_opt()
            .inspect_err(|err| warn!("{title} prompt failed: {err}"))
            .ok()
            .flatten()
    }

    fn info(&mut self, title: &str, message: &str) {
        println!("[{title}] {message}");
    }

    fn error(&mut self, title: &str, message: &str) {
        eprintln!("[{title}] {message}");
    }
}

/// Answer consumed by [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Choice(usize),
    /// The user closed the prompt
    Dismiss,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message shown through [`Prompter::info`] or [`Prompter::error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// Headless prompter answering from a script and recording every notice
///
/// Running out of answers behaves like the user closing the prompt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
    notices: Vec<Notice>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Titles of the prompts shown so far
    #[must_use]
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn errors(&self) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .collect()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, title: &str) -> Option<Answer> {
        self.asked.push(title.to_string());
        self.answers.pop_front()
    }

    fn notify(&mut self, level: NoticeLevel, title: &str, message: &str) {
        self.notices.push(Notice {
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_secret(&mut self, title: &str, _prompt: &str) -> Option<String> {
        match self.next(title) {
            Some(Answer::Text(value)) => Some(value),
            _ => None,
        }
    }

    fn ask_text(&mut self, title: &str, _prompt: &str, _initial: &str) -> Option<String> {
        match self.next(title) {
            Some(Answer::Text(value)) => Some(value),
            _ => None,
        }
    }

    fn confirm(&mut self, title: &str, _question: &str) -> bool {
        matches!(self.next(title), Some(Answer::Confirm(true)))
    }

    fn choose(&mut self, title: &str, _prompt: &str, options: &[&str]) -> Option<usize> {
        match self.next(title) {
            Some(Answer::Choice(index)) if index < options.len() => Some(index),
            _ => None,
        }
    }

    fn info(&mut self, title: &str, message: &str) {
        self.notify(NoticeLevel::Info, title, message);
    }

    fn error(&mut self, title: &str, message: &str) {
        self.notify(NoticeLevel::Error, title, message);
    }
}
