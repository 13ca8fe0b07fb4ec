use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use std::path::PathBuf;
use std::fs;

/// Consistent, readable test elements
#[allow(dead_code)]
pub fn generate_test_items(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("test_item_{:06}", i).into_bytes())
        .collect()
}

/// `count` distinct random elements of `size` bytes, none of them in `exclude`
#[allow(dead_code)]
pub fn generate_random_items(
    rng: &mut StdRng,
    count: usize,
    size: usize,
    exclude: &HashSet<Vec<u8>>,
) -> Vec<Vec<u8>> {
    let mut seen = HashSet::with_capacity(count);
    while seen.len() < count {
        let mut item = vec![0u8; size];
        rng.fill_bytes(&mut item);
        if !exclude.contains(&item) {
            seen.insert(item);
        }
    }
    seen.into_iter().collect()
}

#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Temporary file that is removed when dropped
#[allow(dead_code)]
pub struct TestFile {
    path: PathBuf,
}

#[allow(dead_code)]
impl TestFile {
    pub fn new(test_name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "bloomy_test_{}_{}.bloom",
            test_name,
            std::process::id()
        ));
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
