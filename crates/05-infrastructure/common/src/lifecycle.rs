//! 组件生命周期管理

use crate::errors::{DynError, LifecycleError};
use serde::{Deserialize, Serialize};

/// 组件生命周期管理 trait
///
/// 实例通过此 trait 暴露启动/停止能力，未实现的实例在生命周期调用中被跳过。
pub trait Lifecycle: Send + Sync {
    /// 组件启动
    fn on_start(&self) -> Result<(), DynError> {
        Ok(())
    }

    /// 组件停止
    fn on_stop(&self) -> Result<(), DynError> {
        Ok(())
    }
}

/// 组件生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// 未启动
    #[default]
    Uninitialized,
    /// 运行中
    Running,
    /// 已停止
    Stopped,
    /// 钩子执行失败
    Failed,
}

impl LifecycleState {
    /// 是否可以启动
    pub fn can_start(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Stopped)
    }

    /// 是否可以停止
    pub fn can_stop(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// 生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Start,
    Shutdown,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// 单个实例的生命周期故障
#[derive(Debug)]
pub struct LifecycleFault {
    /// 实例在实例数组中的下标
    pub index: usize,
    /// 故障详情
    pub error: LifecycleError,
}

impl LifecycleFault {
    /// 出错组件的类型名称
    pub fn type_name(&self) -> &str {
        self.error.type_name()
    }
}

/// 一次启动或停止过程的结果
///
/// 故障在这里汇总，不会以错误形式向调用方传播。
#[derive(Debug)]
pub struct LifecycleReport {
    /// 生命周期阶段
    pub phase: LifecyclePhase,
    /// 成功执行钩子的实例数量
    pub completed: usize,
    /// 未暴露生命周期能力而被跳过的实例数量
    pub skipped: usize,
    /// 执行失败的实例
    pub faults: Vec<LifecycleFault>,
}

impl LifecycleReport {
    /// 创建空报告
    pub fn new(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            completed: 0,
            skipped: 0,
            faults: Vec::new(),
        }
    }

    /// 是否全部成功
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// 调用过钩子的实例数量（含失败）
    pub fn invoked(&self) -> usize {
        self.completed + self.faults.len()
    }
}
