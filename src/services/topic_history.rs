//! 最近话题记录 - 业务能力层
//!
//! 只负责"记住最近生成过什么"，用于避免立即重复。
//! 每个会话一个有界环形缓冲区，会话数量也有上限。

use std::collections::{HashMap, VecDeque};

/// 有界的最近记录，满了以后挤掉最旧的一条
#[derive(Debug, Clone, Default)]
pub struct RecentHistory {
    items: VecDeque<String>,
    capacity: usize,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加一条记录，超过容量时丢弃最旧的
    pub fn push(&mut self, item: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item.into());
    }

    /// 是否已出现过（忽略大小写和首尾空白）
    pub fn contains(&self, item: &str) -> bool {
        let needle = item.trim().to_lowercase();
        self.items
            .iter()
            .any(|existing| existing.trim().to_lowercase() == needle)
    }

    /// 从旧到新
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

/// 按会话保存的最近记录
///
/// 会话数超过上限时淘汰最早创建的会话。
#[derive(Debug)]
pub struct SessionHistories {
    sessions: HashMap<String, RecentHistory>,
    order: VecDeque<String>,
    history_capacity: usize,
    max_sessions: usize,
}

impl SessionHistories {
    pub fn new(history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            order: VecDeque::new(),
            history_capacity,
            max_sessions: max_sessions.max(1),
        }
    }

    /// 取出（必要时创建）某个会话的记录
    pub fn session(&mut self, session_id: &str) -> &mut RecentHistory {
        if !self.sessions.contains_key(session_id) {
            while self.order.len() >= self.max_sessions {
                if let Some(oldest) = self.order.pop_front() {
                    self.sessions.remove(&oldest);
                }
            }
            self.order.push_back(session_id.to_string());
        }

        let capacity = self.history_capacity;
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| RecentHistory::new(capacity))
    }

    /// 某个会话最近记录的快照（不存在时为空）
    pub fn snapshot(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .get(session_id)
            .map(|h| h.items().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
