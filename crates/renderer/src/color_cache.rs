//! Memoization of value→color resolution.
//!
//! Color resolution is a pure function of (data type, data scale, raw
//! value) and the value space is a single byte, so each (type, scale)
//! bucket memoizes at most 256 entries and is never evicted for the
//! lifetime of the process. Buckets are created lazily on first
//! encounter of a new (type, scale) pair and shared across frames.

use crate::color::{Color, ColorResolver};
use radar_common::{DataScale, DataType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Memo table for one (data type, data scale) pair.
#[derive(Debug)]
pub struct ColorBucket {
    slots: Mutex<Box<[Option<Color>; 256]>>,
    computations: AtomicU64,
}

impl ColorBucket {
    fn new() -> Self {
        Self {
            slots: Mutex::new(Box::new([None; 256])),
            computations: AtomicU64::new(0),
        }
    }

    /// Resolve a raw value, computing the color at most once per value.
    pub fn resolve(&self, resolver: ColorResolver, scale: &DataScale, value: u8) -> Color {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots[value as usize] {
            Some(color) => color,
            None => {
                let color = resolver.resolve(scale, value);
                slots[value as usize] = Some(color);
                self.computations.fetch_add(1, Ordering::Relaxed);
                color
            }
        }
    }

    /// Number of colors computed (as opposed to served from the memo),
    /// for purity assertions.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }
}

/// Process-wide color cache, bucketed by (data type, data scale).
#[derive(Debug, Default)]
pub struct ColorCache {
    buckets: RwLock<HashMap<String, Arc<ColorBucket>>>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_key(data_type: &DataType, scale: &DataScale) -> String {
        format!("{}:{}", data_type.code(), scale.bucket_id())
    }

    /// Get or lazily create the bucket for a (data type, data scale) pair.
    pub fn bucket(&self, data_type: &DataType, scale: &DataScale) -> Arc<ColorBucket> {
        let key = Self::bucket_key(data_type, scale);

        {
            let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
            if let Some(bucket) = buckets.get(&key) {
                return Arc::clone(bucket);
            }
        }

        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        // Double-check after acquiring the write lock
        Arc::clone(
            buckets
                .entry(key)
                .or_insert_with(|| Arc::new(ColorBucket::new())),
        )
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
