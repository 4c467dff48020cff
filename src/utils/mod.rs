//! Utility functions for layout-match

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::layout::{to_sequence, LayoutTree, WidgetKind};
use crate::Result;

/// Save object to JSON file
pub fn save_json<T: Serialize, P: AsRef<Path>>(obj: &T, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(obj)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Load object from JSON file
pub fn load_json<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let obj = serde_json::from_str(&contents)?;
    Ok(obj)
}

/// Generate a random layout tree with `size` widget nodes
///
/// Deterministic for a given `seed`. Every node picks its parent uniformly
/// among the nodes created before it (the dummy root included).
pub fn random_tree(size: usize, seed: u64) -> LayoutTree {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = LayoutTree::new();

    for node in 1..=size {
        let parent = rng.gen_range(0..node);
        let kind = WidgetKind::ALL[rng.gen_range(0..WidgetKind::COUNT)];
        tree.push_node(parent, kind);
    }

    tree
}

/// Token sequence of [`random_tree`]
pub fn random_sequence(size: usize, seed: u64) -> String {
    to_sequence(&random_tree(size, seed))
}

/// Timing utilities
pub mod timing {
    use std::time::Instant;

    /// Logs its lifetime at debug level when dropped
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        /// Start new timer
        pub fn new(name: &str) -> Self {
            Timer {
                start: Instant::now(),
                name: name.to_string(),
            }
        }

        /// Get elapsed time in seconds
        pub fn elapsed(&self) -> f32 {
            self.start.elapsed().as_secs_f32()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            log::debug!("{}: {:.3}s", self.name, self.elapsed());
        }
    }
}
