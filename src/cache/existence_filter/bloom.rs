use parking_lot::RwLock;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::cache::ExistenceFilter;
use crate::declare_existence_filter_plugin;
use crate::errors::{LinkpressError, Result};

declare_existence_filter_plugin!("bloom", BloomExistenceFilter);

const WORD_BITS: usize = u64::BITS as usize;

/// 固定尺寸的 Bloom Filter
///
/// 位数组大小 `m` 和哈希个数 `k` 在构造时确定，之后只会置位、从不清空。
/// 第 i 个哈希函数就是以 i 为 seed 的 xxh64。
pub struct BloomExistenceFilter {
    bits: RwLock<Vec<u64>>,
    num_bits: usize,
    num_hashes: u32,
}

impl BloomExistenceFilter {
    pub fn new(num_bits: usize, num_hashes: u32) -> Result<Self> {
        if num_bits == 0 || num_hashes == 0 {
            return Err(LinkpressError::config(format!(
                "Bloom filter needs bits > 0 and hashes > 0 (got bits={}, hashes={})",
                num_bits, num_hashes
            )));
        }

        let words = num_bits.div_ceil(WORD_BITS);
        debug!(
            "Bloom filter allocated: m={} bits ({} KiB), k={}",
            num_bits,
            words * 8 / 1024,
            num_hashes
        );

        Ok(Self {
            bits: RwLock::new(vec![0u64; words]),
            num_bits,
            num_hashes,
        })
    }

    pub fn from_config() -> Result<Self> {
        let config = crate::config::get_config();
        Self::new(config.filter.bits, config.filter.hashes)
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// 插入 `items` 个元素后的理论误判率 `(1 - e^(-k*n/m))^k`
    pub fn estimated_fp_rate(&self, items: usize) -> f64 {
        let k = self.num_hashes as f64;
        let exponent = -k * items as f64 / self.num_bits as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    #[inline]
    fn index(&self, key: &str, seed: u32) -> usize {
        (xxh64(key.as_bytes(), seed as u64) % self.num_bits as u64) as usize
    }
}

impl ExistenceFilter for BloomExistenceFilter {
    fn contains(&self, key: &str) -> bool {
        let bits = self.bits.read();
        (0..self.num_hashes).all(|seed| {
            let idx = self.index(key, seed);
            bits[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0
        })
    }

    fn add(&self, key: &str) {
        // 哈希在锁外计算，写锁只覆盖置位
        let indices: Vec<usize> = (0..self.num_hashes)
            .map(|seed| self.index(key, seed))
            .collect();

        let mut bits = self.bits.write();
        for idx in indices {
            bits[idx / WORD_BITS] |= 1u64 << (idx % WORD_BITS);
        }
    }

    fn add_all(&self, keys: &[String]) {
        let mut bits = self.bits.write();
        for key in keys {
            for seed in 0..self.num_hashes {
                let idx = self.index(key, seed);
                bits[idx / WORD_BITS] |= 1u64 << (idx % WORD_BITS);
            }
        }
        debug!("Bulk inserted {} keys into bloom filter", keys.len());
    }
}
