//! ratatui browse UI.
//!
//! Shows the document list (filtered by tags and filename text), a tag
//! sidebar and a banner when the watched directory holds files that are not
//! cataloged yet. Every key that changes something is one `Organizer` call.

pub mod widgets;

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use scanshelf_core::tags::parse_tag_list;
use scanshelf_core::Organizer;
use storage::{Document, DocumentQuery, TagSummary};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    TagFilter,
    TextFilter,
    EditTags(TagEditor),
}

/// Popup state for editing one document's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEditor {
    pub filename: String,
    pub tags: Vec<String>,
    pub selected: usize,
    pub input: String,
}

impl TagEditor {
    fn new(document: &Document) -> Self {
        Self {
            filename: document.filename.clone(),
            tags: document.tags.clone(),
            selected: 0,
            input: String::new(),
        }
    }

    fn reload(&mut self, document: &Document) {
        self.tags = document.tags.clone();
        if self.selected >= self.tags.len() {
            self.selected = self.tags.len().saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct BrowseApp {
    organizer: Organizer,
    documents: Vec<Document>,
    tag_summaries: Vec<TagSummary>,
    pending: Vec<String>,
    selected: usize,
    tag_filter: Vec<String>,
    text_filter: Option<String>,
    untagged_only: bool,
    input: String,
    mode: Mode,
    status: Option<StatusLine>,
    should_quit: bool,
}

impl BrowseApp {
    pub fn new(organizer: Organizer) -> Self {
        Self {
            organizer,
            documents: Vec::new(),
            tag_summaries: Vec::new(),
            pending: Vec::new(),
            selected: 0,
            tag_filter: Vec::new(),
            text_filter: None,
            untagged_only: false,
            input: String::new(),
            mode: Mode::Browse,
            status: None,
            should_quit: false,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn tag_summaries(&self) -> &[TagSummary] {
        &self.tag_summaries
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.documents.get(self.selected)
    }

    pub fn tag_filter(&self) -> &[String] {
        &self.tag_filter
    }

    pub fn text_filter(&self) -> Option<&str> {
        self.text_filter.as_deref()
    }

    pub fn untagged_only(&self) -> bool {
        self.untagged_only
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn query(&self) -> DocumentQuery {
        let mut query =
            DocumentQuery::with_tags(&self.tag_filter).untagged(self.untagged_only);
        if let Some(text) = &self.text_filter {
            query = query.text(text.clone());
        }
        query
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.refresh().await;
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal).await;
        ratatui::restore();
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| widgets::render(frame, self))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.handle_key(key).await;
                }
            }
        }
        Ok(())
    }

    /// Reload documents, tag counts and pending files, keeping the selection
    /// index inside the new list.
    pub async fn refresh(&mut self) {
        let query = self.query();
        let documents = self.organizer.browse(&query).await;
        match documents {
            Ok(docs) => self.documents = docs,
            Err(e) => self.set_error(format!("listing failed: {e}")),
        }
        let tags = self.organizer.tags().await;
        match tags {
            Ok(tags) => self.tag_summaries = tags,
            Err(e) => self.set_error(format!("tag listing failed: {e}")),
        }
        let pending = self.organizer.pending_files().await;
        match pending {
            Ok(pending) => self.pending = pending,
            Err(e) => {
                self.pending.clear();
                self.set_error(e.to_string());
            }
        }
        if self.selected >= self.documents.len() {
            self.selected = self.documents.len().saturating_sub(1);
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.mode {
            Mode::Browse => self.handle_browse_key(key.code).await,
            Mode::TagFilter | Mode::TextFilter => self.handle_filter_key(key.code).await,
            Mode::EditTags(_) => self.handle_editor_key(key.code).await,
        }
    }

    async fn handle_browse_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.documents.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.documents.len().saturating_sub(1),
            KeyCode::Char(' ') => self.quicklook().await,
            KeyCode::Enter => {
                if let Some(doc) = self.selected_document() {
                    self.mode = Mode::EditTags(TagEditor::new(doc));
                }
            }
            KeyCode::Char('/') | KeyCode::Char('t') => {
                self.input = self.tag_filter.join(" ");
                self.mode = Mode::TagFilter;
            }
            KeyCode::Char('f') => {
                self.input = self.text_filter.clone().unwrap_or_default();
                self.mode = Mode::TextFilter;
            }
            KeyCode::Char('u') => {
                self.untagged_only = !self.untagged_only;
                self.selected = 0;
                self.refresh().await;
            }
            KeyCode::Char('i') => self.import().await,
            KeyCode::Char('r') => {
                self.status = None;
                self.refresh().await;
            }
            _ => {}
        }
    }

    async fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.input);
                if self.mode == Mode::TagFilter {
                    debug!(tags = %input, "tag filter");
                    self.tag_filter = parse_tag_list(&input);
                } else {
                    debug!(text = %input, "text filter");
                    let text = input.trim();
                    self.text_filter = (!text.is_empty()).then(|| text.to_string());
                }
                self.mode = Mode::Browse;
                self.selected = 0;
                self.refresh().await;
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Browse;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    async fn handle_editor_key(&mut self, code: KeyCode) {
        let Mode::EditTags(editor) = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.refresh().await;
            }
            KeyCode::Up => editor.selected = editor.selected.saturating_sub(1),
            KeyCode::Down => {
                if editor.selected + 1 < editor.tags.len() {
                    editor.selected += 1;
                }
            }
            KeyCode::Char(c) => editor.input.push(c),
            KeyCode::Enter => {
                let names = parse_tag_list(&editor.input);
                editor.input.clear();
                if names.is_empty() {
                    return;
                }
                let filename = editor.filename.clone();
                let result = self.organizer.add_tags(&filename, &names).await;
                self.apply_editor_result(result, format!("tagged {filename}"));
            }
            KeyCode::Backspace => {
                if editor.input.pop().is_some() {
                    return;
                }
                let Some(name) = editor.tags.get(editor.selected).cloned() else {
                    return;
                };
                let filename = editor.filename.clone();
                let result = self
                    .organizer
                    .remove_tags(&filename, std::slice::from_ref(&name))
                    .await;
                self.apply_editor_result(result, format!("removed {name} from {filename}"));
            }
            _ => {}
        }
    }

    fn apply_editor_result(
        &mut self,
        result: Result<Document, storage::CatalogError>,
        message: String,
    ) {
        match result {
            Ok(doc) => {
                if let Mode::EditTags(editor) = &mut self.mode {
                    editor.reload(&doc);
                }
                self.set_info(message);
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    async fn quicklook(&mut self) {
        let Some(filename) = self.selected_document().map(|d| d.filename.clone()) else {
            return;
        };
        let launched = self.organizer.quicklook(&filename).await;
        match launched {
            Ok(path) => self.set_info(format!("previewing {}", path.display())),
            Err(e) => {
                warn!("quicklook failed: {e:#}");
                self.set_error(format!("{e:#}"));
            }
        }
    }

    /// Always rescans the directory; `pending` may predate files that
    /// arrived since the last refresh.
    async fn import(&mut self) {
        let imported = self.organizer.import().await;
        self.refresh().await;
        match imported {
            Ok(summary) if summary.imported.is_empty() => {
                self.set_info("no new documents".to_string());
            }
            Ok(summary) => {
                self.set_info(format!("imported {} new documents", summary.imported.len()));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusLine {
            text,
            is_error: false,
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(StatusLine {
            text,
            is_error: true,
        });
    }
}

/// Launch the browse UI over an already constructed organizer.
pub async fn launch(organizer: Organizer) -> anyhow::Result<()> {
    let mut app = BrowseApp::new(organizer);
    app.run().await
}
