use std::collections::VecDeque;

use serde::Serialize;

use super::AssetCandidateList;

/// 单个资源实例的加载状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AssetState {
    /// 正在尝试 `current`
    Pending { current: String },
    /// 已成功加载
    Loaded(String),
    /// 没有可用候选；`attempted` 为 0 表示列表一开始就是空的
    Exhausted { attempted: usize },
}

/// 资源加载状态机：`Pending → Loaded | Exhausted`
///
/// 展示层负责触发重试（报告成功或失败），这里只持有候选数据。
/// 每个实例只属于一个资源，多个资源之间互不影响。
#[derive(Debug, Clone)]
pub struct AssetLoad {
    state: AssetState,
    remaining: VecDeque<String>,
    attempted: usize,
}

impl AssetLoad {
    pub fn start(list: AssetCandidateList) -> Self {
        let mut remaining: VecDeque<String> = list.into_inner().into();
        let state = match remaining.pop_front() {
            Some(current) => AssetState::Pending { current },
            None => AssetState::Exhausted { attempted: 0 },
        };
        let attempted = usize::from(matches!(state, AssetState::Pending { .. }));
        Self { state, remaining, attempted }
    }

    pub fn state(&self) -> &AssetState {
        &self.state
    }

    /// 当前应展示/尝试的定位符
    pub fn current(&self) -> Option<&str> {
        match &self.state {
            AssetState::Pending { current } => Some(current),
            AssetState::Loaded(locator) => Some(locator),
            AssetState::Exhausted { .. } => None,
        }
    }

    /// 当前候选加载成功
    pub fn report_success(&mut self) {
        if let AssetState::Pending { current } = &self.state {
            self.state = AssetState::Loaded(current.clone());
            self.remaining.clear();
        }
    }

    /// 当前候选加载失败：丢弃它并切换到下一个，返回新的候选
    ///
    /// 候选耗尽后进入 `Exhausted`，返回 None；不会 panic。
    pub fn report_failure(&mut self) -> Option<&str> {
        if !matches!(self.state, AssetState::Pending { .. }) {
            return None;
        }

        match self.remaining.pop_front() {
            Some(next) => {
                self.attempted += 1;
                self.state = AssetState::Pending { current: next };
            }
            None => {
                tracing::debug!(attempted = self.attempted, "资源候选已耗尽");
                self.state = AssetState::Exhausted { attempted: self.attempted };
            }
        }
        self.current()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, AssetState::Loaded(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, AssetState::Exhausted { .. })
    }

    /// 还未尝试的候选数
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> AssetCandidateList {
        items.iter().copied().collect()
    }

    #[test]
    fn test_falls_through_to_third_candidate() {
        let mut load = list(&["a.png", "b.png", "c.png"]).into_load();
        assert_eq!(load.current(), Some("a.png"));
        assert_eq!(load.report_failure(), Some("b.png"));
        assert_eq!(load.report_failure(), Some("c.png"));
        load.report_success();
        assert!(load.is_loaded());
        assert_eq!(load.current(), Some("c.png"));
    }

    #[test]
    fn test_all_fail_ends_exhausted() {
        let mut load = list(&["a.png", "b.png", "c.png"]).into_load();
        load.report_failure();
        load.report_failure();
        assert_eq!(load.report_failure(), None);
        assert_eq!(load.state(), &AssetState::Exhausted { attempted: 3 });
        // 耗尽后继续报告失败不改变状态
        assert_eq!(load.report_failure(), None);
        assert!(load.is_exhausted());
    }

    #[test]
    fn test_empty_list_starts_exhausted() {
        let load = AssetCandidateList::new().into_load();
        assert_eq!(load.state(), &AssetState::Exhausted { attempted: 0 });
        assert_eq!(load.current(), None);
    }

    #[test]
    fn test_success_is_terminal() {
        let mut load = list(&["a.png", "b.png"]).into_load();
        load.report_success();
        assert_eq!(load.report_failure(), None);
        assert_eq!(load.current(), Some("a.png"));
        assert_eq!(load.remaining(), 0);
    }
}
