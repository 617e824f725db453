use super::*;
use tempfile::tempdir;

fn temp_store() -> (StreamStore, tempfile::TempDir) {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("streams").join("clicks.jsonl");
    (StreamStore::new(path), dir)
}

fn rec(data: &[u8], key: &str) -> Record {
    Record::new(data.to_vec(), key.to_string())
}

#[test]
fn append_then_read_back_in_order() {
    let (store, _dir) = temp_store();

    let written = store
        .append(&[rec(b"one", "k1"), rec(b"two", "k2")])
        .expect("append");
    assert_eq!(written, 2);
    store.append(&[rec(&[0, 159, 146, 150], "k3")]).unwrap();

    let all = store.recent(10);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], rec(b"one", "k1"));
    assert_eq!(all[2].data, vec![0, 159, 146, 150]);
    assert_eq!(store.recent(usize::MAX).len(), 3);
}

#[test]
fn recent_returns_the_tail() {
    let (store, _dir) = temp_store();
    for i in 0..5u8 {
        store.append(&[rec(&[i], "k")]).unwrap();
    }

    let tail: Vec<u8> = store.recent(2).into_iter().map(|r| r.data[0]).collect();
    assert_eq!(tail, vec![3, 4]);
    assert!(store.recent(0).is_empty());
}

#[test]
fn missing_file_reads_as_empty() {
    let (store, _dir) = temp_store();
    assert_eq!(store.iter_records().count(), 0);
    assert!(store.recent(5).is_empty());
}

#[test]
fn empty_batch_does_not_create_the_file() {
    let (store, _dir) = temp_store();
    assert_eq!(store.append(&[]).unwrap(), 0);
    assert!(!store.path().exists());
}

#[test]
fn malformed_lines_are_skipped() {
    use std::io::Write as _;

    let (store, _dir) = temp_store();
    store.append(&[rec(b"good", "k")]).unwrap();

    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.path())
            .expect("open stream log");
        writeln!(file, "this is not json").unwrap();
    }

    store.append(&[rec(b"also good", "k")]).unwrap();

    let data: Vec<Vec<u8>> = store.recent(10).into_iter().map(|r| r.data).collect();
    assert_eq!(data, vec![b"good".to_vec(), b"also good".to_vec()]);
}

#[test]
fn stream_name_validation() {
    for ok in ["clicks", "app.events-v2", "A_1"] {
        assert!(validate_stream_name(ok).is_ok(), "{ok} should be valid");
    }
    let too_long = "x".repeat(129);
    for bad in ["", "../etc", "a/b", ".hidden", "sp ace", too_long.as_str()] {
        assert!(validate_stream_name(bad).is_err(), "{bad:?} should be rejected");
    }
}
