use scanshelf_core::config::{AppConfig, DatabaseConfig, LoggingConfig, PreviewConfig, ScanConfig};
use scanshelf_core::importer::{import_new_files, FileFilter};
use scanshelf_core::{ImportError, Organizer};
use std::fs;
use std::path::Path;
use storage::{Catalog, DocumentQuery};
use tempfile::tempdir;

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

fn seed_scans(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("scan1.pdf"), "%PDF-1.4").unwrap();
    fs::write(dir.join("scan2.pdf"), "%PDF-1.4").unwrap();
    fs::write(dir.join("notes.txt"), "not a scan").unwrap();
}

#[tokio::test]
async fn import_registers_only_matching_files() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    let summary = organizer.import().await.unwrap();
    assert_eq!(summary.imported, vec!["scan1.pdf", "scan2.pdf"]);
    assert_eq!(summary.skipped, 0);

    let docs = organizer.browse(&DocumentQuery::all()).await.unwrap();
    let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["scan1.pdf", "scan2.pdf"]);
    assert!(docs.iter().all(|d| d.is_untagged()));
    assert!(organizer.tags().await.unwrap().is_empty());
}

#[tokio::test]
async fn reimport_without_new_files_is_a_noop() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    organizer.import().await.unwrap();
    let before = organizer.catalog().document_count().await.unwrap();

    let again = organizer.import().await.unwrap();
    assert!(again.imported.is_empty());
    assert_eq!(organizer.catalog().document_count().await.unwrap(), before);
    assert!(organizer.pending_files().await.unwrap().is_empty());

    fs::write(cfg.scan.dir.join("scan3.pdf"), "%PDF-1.4").unwrap();
    assert_eq!(organizer.pending_files().await.unwrap(), vec!["scan3.pdf"]);
    let third = organizer.import().await.unwrap();
    assert_eq!(third.imported, vec!["scan3.pdf"]);

    let all = organizer
        .catalog()
        .documents_by_tags(Vec::<String>::new())
        .await
        .unwrap();
    let scan3 = all.iter().filter(|d| d.filename == "scan3.pdf").count();
    assert_eq!(scan3, 1);
}

#[tokio::test]
async fn documents_cataloged_meanwhile_are_skipped_not_errors() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let catalog = Catalog::open(&cfg.database.path).await.unwrap();
    let filter = FileFilter::from_config(&cfg.scan).unwrap();
    // a second handle on the same database plays the racing writer
    let other = Catalog::open(&cfg.database.path).await.unwrap();
    other.create_document("scan2.pdf").await.unwrap();

    let summary = import_new_files(&cfg.scan.dir, &filter, &catalog).await.unwrap();
    assert_eq!(summary.imported, vec!["scan1.pdf"]);
    assert_eq!(catalog.document_count().await.unwrap(), 2);
}

#[tokio::test]
async fn unreadable_directory_fails_the_import_only() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    let err = organizer.import().await.unwrap_err();
    assert!(matches!(err, ImportError::MissingDirectory(_)));

    // catalog is still usable
    assert_eq!(organizer.catalog().document_count().await.unwrap(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_directory_is_reported_and_catalog_untouched() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    organizer.catalog().create_document("scan1.pdf").await.unwrap();

    fs::set_permissions(&cfg.scan.dir, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&cfg.scan.dir).is_ok() {
        // permission bits do not bind this user (root)
        fs::set_permissions(&cfg.scan.dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = organizer.import().await;
    let pending = organizer.pending_files().await;
    fs::set_permissions(&cfg.scan.dir, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(
        matches!(err, ImportError::Unreadable { ref path, .. } if path == &cfg.scan.dir),
        "unexpected error: {err:?}"
    );
    assert!(matches!(pending, Err(ImportError::Unreadable { .. })));
    assert_eq!(organizer.catalog().document_count().await.unwrap(), 1);
}

#[tokio::test]
async fn tag_edits_go_through_the_organizer() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    organizer.import().await.unwrap();

    let doc = organizer
        .add_tags("scan1.pdf", &[" health ".to_string(), "2023".to_string()])
        .await
        .unwrap();
    assert_eq!(doc.tags, vec!["2023", "health"]);

    let doc = organizer
        .add_tags("scan1.pdf", &["health".to_string()])
        .await
        .unwrap();
    assert_eq!(doc.tags, vec!["2023", "health"]);

    let err = organizer
        .add_tags("scan1.pdf", &["fine".to_string(), "".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, storage::CatalogError::InvalidTagName { .. }));
    assert_eq!(
        organizer.document("scan1.pdf").await.unwrap().tags,
        vec!["2023", "health"]
    );

    let doc = organizer
        .remove_tags("scan1.pdf", &["2023".to_string(), "missing".to_string()])
        .await
        .unwrap();
    assert_eq!(doc.tags, vec!["health"]);

    let doc = organizer
        .set_tags("scan2.pdf", &["bank".to_string(), "health".to_string()])
        .await
        .unwrap();
    assert_eq!(doc.tags, vec!["bank", "health"]);

    let health = organizer
        .browse(&DocumentQuery::with_tags(["health"]))
        .await
        .unwrap();
    assert_eq!(health.len(), 2);
    let both = organizer
        .browse(&DocumentQuery::with_tags(["health", "bank"]))
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].filename, "scan2.pdf");

    let err = organizer
        .add_tags("ghost.pdf", &["x".to_string()])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn quicklook_requires_a_cataloged_file_and_reports_launch_failure() {
    let temp = tempdir().unwrap();
    let cfg = test_config(temp.path());
    seed_scans(&cfg.scan.dir);

    let organizer = Organizer::from_config(&cfg).await.unwrap();
    assert!(organizer.quicklook("scan1.pdf").await.is_err());

    organizer.import().await.unwrap();
    let err = organizer.quicklook("scan1.pdf").await.unwrap_err();
    assert!(format!("{err:#}").contains("scanshelf-no-such-previewer"));
    // the failed launch leaves the catalog untouched
    assert!(organizer.document("scan1.pdf").await.unwrap().is_untagged());
}
