//! Concurrent access tests
//!
//! The server shares one repository between all request handlers. These
//! tests hammer a shared repository from several threads and check that
//! ids stay unique and no writes are lost.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Utc;
use tempfile::TempDir;

use cyberblog_core::adapters::duckdb::DuckDbRepository;
use cyberblog_core::domain::NewUser;

fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("concurrent.duckdb");
    let repo = DuckDbRepository::new(&db_path).unwrap();
    repo.ensure_schema().unwrap();
    Arc::new(repo)
}

#[test]
fn test_concurrent_registrations_get_distinct_ids() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = vec![];

    for i in 0..num_threads {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let name = format!("user{}", i);
            let user = repo
                .insert_user(
                    &NewUser::new(&name, &format!("{}@example.com", name), "hash"),
                    Utc::now(),
                )
                .unwrap();
            repo.insert_profile(user.id).unwrap();
            user.id
        }));
    }

    let ids: HashSet<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    println!("Assigned ids: {:?}", ids);

    assert_eq!(ids.len(), num_threads);
    assert_eq!(repo.count_users().unwrap(), num_threads as i64);
    assert_eq!(repo.count_profiles().unwrap(), num_threads as i64);
}

#[test]
fn test_concurrent_thoughts_and_reads() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let author_id = repo
        .insert_user(&NewUser::new("alice", "alice@example.com", "hash"), Utc::now())
        .unwrap()
        .id;

    let writers = 4;
    let per_writer = 25;
    let barrier = Arc::new(Barrier::new(writers + 1));
    let mut handles = vec![];

    for w in 0..writers {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for n in 0..per_writer {
                repo.insert_thought(author_id, &format!("writer {} thought {}", w, n), Utc::now())
                    .unwrap();
            }
        }));
    }

    // One reader interleaved with the writers
    let reader = {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let mut last_seen = 0;
            for _ in 0..20 {
                let seen = repo.get_thoughts_by_user(author_id).unwrap().len();
                assert!(seen >= last_seen, "thought count went backwards");
                last_seen = seen;
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    let thoughts = repo.get_thoughts_by_user(author_id).unwrap();
    assert_eq!(thoughts.len(), writers * per_writer);
    let unique: HashSet<i64> = thoughts.iter().map(|t| t.id).collect();
    assert_eq!(unique.len(), thoughts.len());
}
