use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use scanshelf::tui::{widgets, BrowseApp, Mode};
use scanshelf_core::config::{AppConfig, DatabaseConfig, LoggingConfig, PreviewConfig, ScanConfig};
use scanshelf_core::Organizer;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            path: root.join("documents.db").to_string_lossy().into_owned(),
        },
        scan: ScanConfig {
            dir: root.join("scans"),
            patterns: vec!["*.pdf".to_string()],
            include_hidden: false,
        },
        preview: PreviewConfig {
            command: "scanshelf-no-such-previewer".to_string(),
            args: vec![],
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: root.join("scanshelf.log"),
        },
    }
}

async fn app_with_scans() -> (TempDir, BrowseApp) {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    fs::create_dir_all(&cfg.scan.dir).unwrap();
    fs::write(cfg.scan.dir.join("scan1.pdf"), "%PDF-1.4").unwrap();
    fs::write(cfg.scan.dir.join("scan2.pdf"), "%PDF-1.4").unwrap();
    fs::write(cfg.scan.dir.join("notes.txt"), "not a scan").unwrap();

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    let mut app = BrowseApp::new(organizer);
    app.refresh().await;
    (temp, app)
}

async fn press(app: &mut BrowseApp, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).await;
}

async fn type_text(app: &mut BrowseApp, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c)).await;
    }
}

fn filenames(app: &BrowseApp) -> Vec<&str> {
    app.documents().iter().map(|d| d.filename.as_str()).collect()
}

fn screen_text(app: &BrowseApp) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| widgets::render(frame, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[tokio::test]
async fn pending_banner_then_import() {
    let (_temp, mut app) = app_with_scans().await;
    assert!(app.documents().is_empty());
    assert_eq!(app.pending(), ["scan1.pdf", "scan2.pdf"]);
    assert!(screen_text(&app).contains("Import 2 new documents"));

    press(&mut app, KeyCode::Char('i')).await;
    assert_eq!(filenames(&app), vec!["scan1.pdf", "scan2.pdf"]);
    assert!(app.pending().is_empty());
    let status = app.status().unwrap();
    assert!(!status.is_error);
    assert_eq!(status.text, "imported 2 new documents");

    let screen = screen_text(&app);
    assert!(!screen.contains("Import 2 new documents"));
    assert!(screen.contains("<untagged>"));
}

#[tokio::test]
async fn import_key_picks_up_files_that_arrived_after_refresh() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    fs::create_dir_all(&cfg.scan.dir).unwrap();
    let organizer = Organizer::from_config(&cfg).await.unwrap();
    let mut app = BrowseApp::new(organizer);
    app.refresh().await;
    assert!(app.pending().is_empty());

    press(&mut app, KeyCode::Char('i')).await;
    assert_eq!(app.status().unwrap().text, "no new documents");

    fs::write(cfg.scan.dir.join("late.pdf"), "%PDF-1.4").unwrap();
    press(&mut app, KeyCode::Char('i')).await;
    assert_eq!(filenames(&app), vec!["late.pdf"]);
    assert!(app.pending().is_empty());
    let status = app.status().unwrap();
    assert!(!status.is_error);
    assert_eq!(status.text, "imported 1 new documents");
}

#[tokio::test]
async fn tag_editor_adds_and_removes_tags() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('i')).await;

    press(&mut app, KeyCode::Enter).await;
    assert!(matches!(app.mode(), Mode::EditTags(e) if e.filename == "scan1.pdf"));

    type_text(&mut app, "health 2023").await;
    press(&mut app, KeyCode::Enter).await;
    match app.mode() {
        Mode::EditTags(editor) => {
            assert_eq!(editor.tags, vec!["2023", "health"]);
            assert!(editor.input.is_empty());
        }
        other => panic!("editor closed: {other:?}"),
    }
    assert!(screen_text(&app).contains("Tags for scan1.pdf"));

    // empty input: backspace removes the selected tag
    press(&mut app, KeyCode::Backspace).await;
    match app.mode() {
        Mode::EditTags(editor) => assert_eq!(editor.tags, vec!["health"]),
        other => panic!("editor closed: {other:?}"),
    }

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.mode(), &Mode::Browse);
    assert_eq!(app.documents()[0].tags, vec!["health"]);
    assert_eq!(app.tag_summaries().len(), 1);
    assert_eq!(app.tag_summaries()[0].documents, 1);
}

#[tokio::test]
async fn blank_tag_input_is_ignored() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('i')).await;
    press(&mut app, KeyCode::Enter).await;

    // whitespace only input parses to nothing
    type_text(&mut app, "   ").await;
    press(&mut app, KeyCode::Enter).await;
    match app.mode() {
        Mode::EditTags(editor) => assert!(editor.tags.is_empty()),
        other => panic!("editor closed: {other:?}"),
    }
    assert!(app.status().map(|s| !s.is_error).unwrap_or(true));
}

#[tokio::test]
async fn tag_and_text_filters_narrow_the_list() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('i')).await;

    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    type_text(&mut app, "bank").await;
    press(&mut app, KeyCode::Enter).await;
    press(&mut app, KeyCode::Esc).await;

    press(&mut app, KeyCode::Char('t')).await;
    assert_eq!(app.mode(), &Mode::TagFilter);
    type_text(&mut app, "bank").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.tag_filter(), ["bank"]);
    assert_eq!(filenames(&app), vec!["scan2.pdf"]);
    assert_eq!(app.selected(), 0);

    // clearing the tag filter, then a case-insensitive filename filter
    press(&mut app, KeyCode::Char('t')).await;
    for _ in 0.."bank".len() {
        press(&mut app, KeyCode::Backspace).await;
    }
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(filenames(&app).len(), 2);

    press(&mut app, KeyCode::Char('f')).await;
    type_text(&mut app, "SCAN1").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.text_filter(), Some("SCAN1"));
    assert_eq!(filenames(&app), vec!["scan1.pdf"]);

    // Esc leaves the filter untouched
    press(&mut app, KeyCode::Char('f')).await;
    type_text(&mut app, "zzz").await;
    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.text_filter(), Some("SCAN1"));
}

#[tokio::test]
async fn untagged_toggle_and_selection_clamp() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('i')).await;

    press(&mut app, KeyCode::End).await;
    assert_eq!(app.selected(), 1);
    press(&mut app, KeyCode::Enter).await;
    type_text(&mut app, "bank").await;
    press(&mut app, KeyCode::Enter).await;
    press(&mut app, KeyCode::Esc).await;

    press(&mut app, KeyCode::Char('u')).await;
    assert!(app.untagged_only());
    assert_eq!(filenames(&app), vec!["scan1.pdf"]);
    assert_eq!(app.selected(), 0);
    assert!(screen_text(&app).contains("[untagged only]"));

    press(&mut app, KeyCode::Char('u')).await;
    assert_eq!(filenames(&app).len(), 2);
}

#[tokio::test]
async fn quicklook_failure_lands_in_the_status_bar() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('i')).await;

    press(&mut app, KeyCode::Char(' ')).await;
    let status = app.status().unwrap();
    assert!(status.is_error);
    assert!(status.text.contains("scanshelf-no-such-previewer"));
    assert!(!app.should_quit());
}

#[tokio::test]
async fn quit_keys() {
    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('q')).await;
    assert!(app.should_quit());

    let (_temp, mut app) = app_with_scans().await;
    press(&mut app, KeyCode::Char('t')).await;
    // q is text inside an input
    press(&mut app, KeyCode::Char('q')).await;
    assert!(!app.should_quit());
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .await;
    assert!(app.should_quit());
}
