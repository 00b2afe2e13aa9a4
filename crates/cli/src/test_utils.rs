use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let sequence = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    dir.push(format!("{prefix}-{}-{nanos}-{sequence}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
