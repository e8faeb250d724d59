use chrono::{Duration, Utc};
use softwarehub::storage::models::{
    AccountRecord, Patch, ProfileRecord, SessionRecord, SoftwareRecord, Theme,
};
use softwarehub::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_software(id: &str, category: &str) -> SoftwareRecord {
    SoftwareRecord {
        id: id.to_string(),
        created_at: Utc::now(),
        title: format!("Tool {id}"),
        description: "A useful tool".to_string(),
        category: category.to_string(),
        version: "1.0.0".to_string(),
        file_url: format!("http://localhost:8080/files/software-files/software/{id}.zip"),
        file_size: 1024,
        thumbnail_url: None,
        download_count: 0,
        tags: vec!["cli".to_string()],
        is_featured: false,
        author_id: "admin-1".to_string(),
    }
}

fn sample_profile(id: &str, username: &str) -> ProfileRecord {
    ProfileRecord {
        id: id.to_string(),
        created_at: Utc::now(),
        username: username.to_string(),
        avatar_url: None,
        is_admin: false,
    }
}

fn sample_account(email: &str, profile_id: &str) -> AccountRecord {
    AccountRecord {
        email: email.to_string(),
        password_hash: "argon2-hash".to_string(),
        profile_id: profile_id.to_string(),
        created_at: Utc::now(),
    }
}

fn sample_session(profile_id: &str, ttl_hours: i64) -> SessionRecord {
    let now = Utc::now();
    SessionRecord {
        profile_id: profile_id.to_string(),
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours),
    }
}

// ============================================================================
// Software tests
// ============================================================================

#[test]
fn test_put_and_get_software() {
    let (_dir, db) = test_db();
    let software = sample_software("sw-1", "Utilities");

    db.put_software(&software).unwrap();

    let retrieved = db
        .get_software("sw-1")
        .unwrap()
        .expect("software should exist");
    assert_eq!(retrieved.id, "sw-1");
    assert_eq!(retrieved.title, "Tool sw-1");
    assert_eq!(retrieved.category, "Utilities");
    assert_eq!(retrieved.version, "1.0.0");
    assert_eq!(retrieved.file_size, 1024);
    assert_eq!(retrieved.download_count, 0);
    assert_eq!(retrieved.thumbnail_url, None);
    assert_eq!(retrieved.tags, vec!["cli".to_string()]);
    assert!(!retrieved.is_featured);
    assert_eq!(retrieved.author_id, "admin-1");
}

#[test]
fn test_get_software_not_found() {
    let (_dir, db) = test_db();
    assert!(db.get_software("nonexistent").unwrap().is_none());
}

#[test]
fn test_list_software_newest_first() {
    let (_dir, db) = test_db();
    let mut old = sample_software("old", "Utilities");
    old.created_at = Utc::now() - Duration::minutes(10);
    let mut mid = sample_software("mid", "Utilities");
    mid.created_at = Utc::now() - Duration::minutes(5);
    let new = sample_software("new", "Utilities");

    db.put_software(&old).unwrap();
    db.put_software(&new).unwrap();
    db.put_software(&mid).unwrap();

    let records = db.list_software().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[test]
fn test_delete_software() {
    let (_dir, db) = test_db();
    db.put_software(&sample_software("sw-2", "Utilities"))
        .unwrap();

    assert!(db.delete_software("sw-2").unwrap());
    assert!(db.get_software("sw-2").unwrap().is_none());
}

#[test]
fn test_delete_software_not_found() {
    let (_dir, db) = test_db();
    assert!(!db.delete_software("nonexistent").unwrap());
}

#[test]
fn test_update_software_fields() {
    let (_dir, db) = test_db();
    db.put_software(&sample_software("u1", "Utilities"))
        .unwrap();

    let tags = vec!["editor".to_string(), "markdown".to_string()];
    let updated = db
        .update_software(
            "u1",
            Some("Renamed"),
            None, // keep description
            Some("Productivity"),
            Some("2.0.0"),
            Some(&tags),
            Some(true),
            Patch::Absent, // keep thumbnail
        )
        .unwrap();
    assert!(updated);

    let software = db.get_software("u1").unwrap().unwrap();
    assert_eq!(software.title, "Renamed");
    assert_eq!(software.description, "A useful tool");
    assert_eq!(software.category, "Productivity");
    assert_eq!(software.version, "2.0.0");
    assert_eq!(software.tags, tags);
    assert!(software.is_featured);
    assert_eq!(software.thumbnail_url, None);
}

#[test]
fn test_update_software_thumbnail() {
    let (_dir, db) = test_db();
    let mut software = sample_software("t1", "Utilities");
    software.thumbnail_url =
        Some("http://localhost:8080/files/software-images/old.png".to_string());
    db.put_software(&software).unwrap();

    db.update_software(
        "t1",
        None,
        None,
        None,
        None,
        None,
        None,
        Patch::Value("http://localhost:8080/files/software-images/new.png".to_string()),
    )
    .unwrap();
    assert_eq!(
        db.get_software("t1").unwrap().unwrap().thumbnail_url,
        Some("http://localhost:8080/files/software-images/new.png".to_string())
    );

    // Explicit null clears the thumbnail
    db.update_software("t1", None, None, None, None, None, None, Patch::Null)
        .unwrap();
    assert_eq!(db.get_software("t1").unwrap().unwrap().thumbnail_url, None);
}

#[test]
fn test_update_software_not_found() {
    let (_dir, db) = test_db();
    assert!(!db
        .update_software(
            "nonexistent",
            Some("Title"),
            None,
            None,
            None,
            None,
            None,
            Patch::Absent
        )
        .unwrap());
}

#[test]
fn test_increment_download_count() {
    let (_dir, db) = test_db();
    db.put_software(&sample_software("dl", "Utilities")).unwrap();

    assert_eq!(db.increment_download_count("dl").unwrap(), Some(1));
    assert_eq!(db.increment_download_count("dl").unwrap(), Some(2));
    assert_eq!(db.increment_download_count("dl").unwrap(), Some(3));

    let software = db.get_software("dl").unwrap().unwrap();
    assert_eq!(software.download_count, 3);
}

#[test]
fn test_increment_download_count_not_found() {
    let (_dir, db) = test_db();
    assert_eq!(db.increment_download_count("nonexistent").unwrap(), None);
}

#[test]
fn test_count_software() {
    let (_dir, db) = test_db();
    assert_eq!(db.count_software().unwrap(), 0);

    db.put_software(&sample_software("a", "Utilities")).unwrap();
    db.put_software(&sample_software("b", "Games")).unwrap();
    assert_eq!(db.count_software().unwrap(), 2);
}

#[test]
fn test_category_counts_ordering() {
    let (_dir, db) = test_db();
    db.put_software(&sample_software("a", "Utilities")).unwrap();
    db.put_software(&sample_software("b", "Utilities")).unwrap();
    db.put_software(&sample_software("c", "Development"))
        .unwrap();
    db.put_software(&sample_software("d", "Games")).unwrap();

    let counts = db.category_counts().unwrap();
    assert_eq!(
        counts,
        vec![
            ("Utilities".to_string(), 2),
            ("Development".to_string(), 1),
            ("Games".to_string(), 1),
        ]
    );
}

#[test]
fn test_catalog_stats() {
    let (_dir, db) = test_db();
    let mut fresh = sample_software("fresh", "Utilities");
    fresh.download_count = 3;
    db.put_software(&fresh).unwrap();

    let mut old = sample_software("old", "Development");
    old.created_at = Utc::now() - Duration::days(30);
    old.download_count = 7;
    db.put_software(&old).unwrap();

    db.put_software(&sample_software("other", "Utilities"))
        .unwrap();

    let stats = db.catalog_stats(Duration::days(7)).unwrap();
    assert_eq!(stats.total_software, 3);
    assert_eq!(stats.total_downloads, 10);
    assert_eq!(stats.total_categories, 2);
    assert_eq!(stats.recent_uploads, 2);
}

#[test]
fn test_daily_stats_buckets() {
    let (_dir, db) = test_db();
    let mut today = sample_software("today", "Utilities");
    today.download_count = 5;
    db.put_software(&today).unwrap();

    let mut earlier = sample_software("earlier", "Utilities");
    earlier.created_at = Utc::now() - Duration::days(10);
    earlier.download_count = 2;
    db.put_software(&earlier).unwrap();

    // Outside the window, must not appear anywhere
    let mut ancient = sample_software("ancient", "Utilities");
    ancient.created_at = Utc::now() - Duration::days(40);
    db.put_software(&ancient).unwrap();

    let stats = db.daily_stats(30).unwrap();
    assert_eq!(stats.len(), 30);

    let today_date = Utc::now().date_naive();
    assert_eq!(stats[0].date, today_date - Duration::days(29));
    assert_eq!(stats[29].date, today_date);

    assert_eq!(stats[29].uploads, 1);
    assert_eq!(stats[29].downloads, 5);
    assert_eq!(stats[19].uploads, 1);
    assert_eq!(stats[19].downloads, 2);

    let total_uploads: u64 = stats.iter().map(|s| s.uploads).sum();
    assert_eq!(total_uploads, 2);
}

// ============================================================================
// Profile and account tests
// ============================================================================

#[test]
fn test_put_and_get_profile() {
    let (_dir, db) = test_db();
    db.put_profile(&sample_profile("p1", "alice")).unwrap();

    let profile = db.get_profile("p1").unwrap().expect("profile should exist");
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.avatar_url, None);
    assert!(!profile.is_admin);
}

#[test]
fn test_list_profiles_newest_first() {
    let (_dir, db) = test_db();
    let mut first = sample_profile("p-first", "first");
    first.created_at = Utc::now() - Duration::minutes(10);
    db.put_profile(&first).unwrap();
    db.put_profile(&sample_profile("p-second", "second")).unwrap();

    let profiles = db.list_profiles().unwrap();
    let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p-second", "p-first"]);
}

#[test]
fn test_set_profile_admin() {
    let (_dir, db) = test_db();
    db.put_profile(&sample_profile("p2", "bob")).unwrap();

    assert!(db.set_profile_admin("p2", true).unwrap());
    assert!(db.get_profile("p2").unwrap().unwrap().is_admin);

    assert!(db.set_profile_admin("p2", false).unwrap());
    assert!(!db.get_profile("p2").unwrap().unwrap().is_admin);

    assert!(!db.set_profile_admin("nonexistent", true).unwrap());
}

#[test]
fn test_create_account_and_lookup() {
    let (_dir, db) = test_db();
    let mut profile = sample_profile("p3", "admin");
    profile.is_admin = true;

    let created = db
        .create_account(&sample_account("admin@example.com", "p3"), &profile)
        .unwrap();
    assert!(created);

    // Email lookup is case-insensitive
    let account = db
        .get_account("Admin@Example.COM")
        .unwrap()
        .expect("account should exist");
    assert_eq!(account.profile_id, "p3");
    assert_eq!(account.email, "admin@example.com");

    assert!(db.get_profile("p3").unwrap().unwrap().is_admin);
}

#[test]
fn test_create_account_duplicate_email() {
    let (_dir, db) = test_db();
    let created = db
        .create_account(
            &sample_account("taken@example.com", "p4"),
            &sample_profile("p4", "orig"),
        )
        .unwrap();
    assert!(created);

    let duplicate = db
        .create_account(
            &sample_account("taken@example.com", "p5"),
            &sample_profile("p5", "imposter"),
        )
        .unwrap();
    assert!(!duplicate);

    // Nothing from the rejected attempt was written
    assert!(db.get_profile("p5").unwrap().is_none());
    let account = db.get_account("taken@example.com").unwrap().unwrap();
    assert_eq!(account.profile_id, "p4");
}

#[test]
fn test_delete_profile_cascade() {
    let (_dir, db) = test_db();
    db.create_account(
        &sample_account("gone@example.com", "p6"),
        &sample_profile("p6", "leaver"),
    )
    .unwrap();
    db.put_session("digest-p6", &sample_session("p6", 24)).unwrap();
    db.set_theme("p6", Theme::System).unwrap();

    assert!(db.delete_profile("p6").unwrap());

    assert!(db.get_profile("p6").unwrap().is_none());
    assert!(db.get_account("gone@example.com").unwrap().is_none());
    assert!(db.get_session("digest-p6").unwrap().is_none());
    assert!(db.get_theme("p6").unwrap().is_none());

    // The email is free for reuse afterwards
    assert!(db
        .create_account(
            &sample_account("gone@example.com", "p7"),
            &sample_profile("p7", "newcomer"),
        )
        .unwrap());
}

#[test]
fn test_delete_profile_not_found() {
    let (_dir, db) = test_db();
    assert!(!db.delete_profile("nonexistent").unwrap());
}

// ============================================================================
// Session tests
// ============================================================================

#[test]
fn test_put_and_get_session() {
    let (_dir, db) = test_db();
    db.put_session("digest-1", &sample_session("p1", 24)).unwrap();

    let session = db
        .get_session("digest-1")
        .unwrap()
        .expect("session should exist");
    assert_eq!(session.profile_id, "p1");
}

#[test]
fn test_expired_session_reads_absent() {
    let (_dir, db) = test_db();
    db.put_session("digest-2", &sample_session("p1", -1)).unwrap();

    assert!(db.get_session("digest-2").unwrap().is_none());
}

#[test]
fn test_delete_session() {
    let (_dir, db) = test_db();
    db.put_session("digest-3", &sample_session("p1", 24)).unwrap();

    assert!(db.delete_session("digest-3").unwrap());
    assert!(!db.delete_session("digest-3").unwrap());
    assert!(db.get_session("digest-3").unwrap().is_none());
}

#[test]
fn test_purge_expired_sessions() {
    let (_dir, db) = test_db();
    db.put_session("stale", &sample_session("p1", -2)).unwrap();
    db.put_session("live", &sample_session("p1", 24)).unwrap();

    let purged = db.purge_expired_sessions(Utc::now()).unwrap();
    assert_eq!(purged, 1);

    assert!(db.get_session("live").unwrap().is_some());

    // Purging again finds nothing
    assert_eq!(db.purge_expired_sessions(Utc::now()).unwrap(), 0);
}

// ============================================================================
// Theme preference tests
// ============================================================================

#[test]
fn test_theme_preference() {
    let (_dir, db) = test_db();
    assert!(db.get_theme("p1").unwrap().is_none());

    db.set_theme("p1", Theme::System).unwrap();
    assert_eq!(db.get_theme("p1").unwrap(), Some(Theme::System));

    db.set_theme("p1", Theme::Dark).unwrap();
    assert_eq!(db.get_theme("p1").unwrap(), Some(Theme::Dark));
}
