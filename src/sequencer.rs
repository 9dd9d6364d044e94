//! 排序键生成
//!
//! 批次的名义时间戳换算成毫秒后，第 i 条记录的键为 `T + i`。
//! 同一批次内保证唯一；两个批次的名义时间相差不足批次长度毫秒时，
//! 键可能重复，由存储层的唯一约束拒绝后到的批次。

use crate::error::Result;
use crate::utils::{epoch_millis, parse_timestamp};

pub fn sequence_key(base_ms: f64, index: usize) -> f64 {
    base_ms + index as f64
}

/// 以批次名义时间为起点，按 1ms 递增发放排序键
#[derive(Debug, Clone)]
pub struct Sequencer {
    base_ms: f64,
    issued: usize,
}

impl Sequencer {
    pub fn from_millis(base_ms: f64) -> Self {
        Self { base_ms, issued: 0 }
    }

    pub fn anchored_at(raw: &str) -> Result<Self> {
        let base = parse_timestamp(raw)?;
        Ok(Self::from_millis(epoch_millis(&base)))
    }

    pub fn base_ms(&self) -> f64 {
        self.base_ms
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn next_key(&mut self) -> f64 {
        let key = sequence_key(self.base_ms, self.issued);
        self.issued += 1;
        key
    }
}

impl Iterator for Sequencer {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_key())
    }
}
