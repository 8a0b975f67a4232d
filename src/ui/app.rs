//! Playground application state and event loop

use crate::catalog::Catalog;
use crate::runner::{ExecutionResult, SnippetRunner};
use crate::ui::panes::{self, PageRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

/// Output of the most recent run, attached to the entry whose trigger fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRun {
    pub title: String,
    pub result: ExecutionResult,
}

/// The main application state
pub struct App {
    pub catalog: Catalog,
    runner: SnippetRunner,

    /// Index of the entry under the cursor
    pub selected: usize,

    /// Indices of expanded sections
    pub expanded: FxHashSet<usize>,

    /// Shown until the next interaction that changes the page
    pub last_run: Option<LastRun>,

    /// First visible row of the page
    pub scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        App {
            catalog,
            runner: SnippetRunner::new(),
            selected: 0,
            expanded: FxHashSet::default(),
            last_run: None,
            scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        panes::render_header(frame, chunks[0], self.catalog.len());

        let data = PageRenderData {
            catalog: &self.catalog,
            selected: self.selected,
            expanded: &self.expanded,
            last_run: self.last_run.as_ref(),
        };
        panes::render_page(frame, chunks[1], &data, &mut self.scroll);

        panes::render_status_bar(
            frame,
            chunks[2],
            &self.status_message,
            self.selected,
            self.catalog.len(),
            self.last_run.as_ref().map(|run| &run.result),
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.select(self.selected.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.select(self.selected + 1),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(self.catalog.len().saturating_sub(1)),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') => {
                self.last_run = None;
                self.expanded = (0..self.catalog.len()).collect();
                self.status_message = "Expanded all sections".to_string();
            }
            KeyCode::Char('c') => {
                self.last_run = None;
                self.expanded.clear();
                self.status_message = "Collapsed all sections".to_string();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.run_selected(),
            _ => {}
        }
    }

    fn select(&mut self, index: usize) {
        if self.catalog.is_empty() {
            return;
        }
        self.selected = index.min(self.catalog.len() - 1);
        if let Some(entry) = self.catalog.get(self.selected) {
            self.status_message = entry.title().to_string();
        }
    }

    fn toggle_selected(&mut self) {
        self.last_run = None;
        if !self.expanded.remove(&self.selected) {
            self.expanded.insert(self.selected);
        }
    }

    /// Fire the run trigger of the selected entry
    pub fn run_selected(&mut self) {
        let Some(entry) = self.catalog.get(self.selected) else {
            return;
        };
        let title = entry.title().to_string();

        let started = Instant::now();
        let result = self.runner.run(entry.source());
        let elapsed = started.elapsed();
        debug!(%title, ?elapsed, success = result.is_success(), "run trigger fired");

        self.status_message = if result.is_success() {
            format!("Ran '{}' in {} ms", title, elapsed.as_millis())
        } else {
            format!("'{}' failed", title)
        };
        self.expanded.insert(self.selected);
        self.last_run = Some(LastRun { title, result });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("Hello", "int main(void) { printf(\"hi\\n\"); return 0; }"),
            CatalogEntry::new("Broken", "int main(void) { return 1 / 0; }"),
        ])
        .unwrap()
    }

    #[test]
    fn test_navigation_clamps() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected, 1);
        assert_eq!(app.status_message, "Broken");
    }

    #[test]
    fn test_toggle_expands_and_collapses() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Enter);
        assert!(app.expanded.contains(&0));
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.expanded.contains(&0));
    }

    #[test]
    fn test_run_attaches_result_to_title() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Char('r'));

        let run = app.last_run.as_ref().unwrap();
        assert_eq!(run.title, "Hello");
        assert_eq!(run.result.output, "hi");
        assert!(app.expanded.contains(&0));
    }

    #[test]
    fn test_failed_run_reports_error() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('r'));

        let run = app.last_run.as_ref().unwrap();
        assert!(!run.result.is_success());
        assert!(run.result.output.contains("Division by zero"));
        assert_eq!(app.status_message, "'Broken' failed");
    }

    #[test]
    fn test_result_cleared_by_next_interaction() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Char('r'));
        assert!(app.last_run.is_some());

        // moving the cursor alone keeps the output on screen
        press(&mut app, KeyCode::Down);
        assert!(app.last_run.is_some());

        press(&mut app, KeyCode::Enter);
        assert!(app.last_run.is_none());
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut app = App::new(Catalog::builtin());
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.expanded.len(), 21);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.expanded.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = App::new(small_catalog());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
