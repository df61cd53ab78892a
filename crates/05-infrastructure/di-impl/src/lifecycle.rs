//! 生命周期控制器
//!
//! 依次调用实例的启动/停止钩子。单个实例失败（返回错误或 panic）只记录日志并写入报告，
//! 不影响其余实例。

use di_abstractions::Instance;
use infrastructure_common::{
    Lifecycle, LifecycleError, LifecycleFault, LifecyclePhase, LifecycleReport, LifecycleState,
    ShutdownOrder,
};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 生命周期控制器
#[derive(Debug, Default)]
pub struct LifecycleController {
    states: Mutex<Vec<LifecycleState>>,
}

impl LifecycleController {
    /// 创建控制器
    pub fn new() -> Self {
        Self::default()
    }

    /// 重置为跟踪 `count` 个实例
    pub fn track(&self, count: usize) {
        *self.states.lock() = vec![LifecycleState::Uninitialized; count];
    }

    /// 各实例当前状态
    pub fn states(&self) -> Vec<LifecycleState> {
        self.states.lock().clone()
    }

    /// 按实例数组顺序启动
    pub fn start(&self, instances: &[Instance]) -> LifecycleReport {
        self.run(LifecyclePhase::Start, instances, 0..instances.len())
    }

    /// 按配置的顺序停止
    pub fn shutdown(&self, instances: &[Instance], order: ShutdownOrder) -> LifecycleReport {
        match order {
            ShutdownOrder::Registration => {
                self.run(LifecyclePhase::Shutdown, instances, 0..instances.len())
            }
            ShutdownOrder::Reverse => {
                self.run(LifecyclePhase::Shutdown, instances, (0..instances.len()).rev())
            }
        }
    }

    fn run(
        &self,
        phase: LifecyclePhase,
        instances: &[Instance],
        indices: impl Iterator<Item = usize>,
    ) -> LifecycleReport {
        let mut report = LifecycleReport::new(phase);

        for index in indices {
            let instance = &instances[index];
            let Some(hook) = instance.lifecycle() else {
                report.skipped += 1;
                continue;
            };

            match invoke(phase, instance.type_name(), hook) {
                Ok(()) => {
                    match phase {
                        LifecyclePhase::Start => info!("组件已启动: {}", instance.type_name()),
                        LifecyclePhase::Shutdown => info!("组件已停止: {}", instance.type_name()),
                    }
                    self.set_state(index, phase_state(phase));
                    report.completed += 1;
                }
                Err(e) => {
                    match phase {
                        LifecyclePhase::Start => {
                            error!(component = %instance.type_name(), error = %e, "组件启动失败");
                        }
                        LifecyclePhase::Shutdown => {
                            error!(component = %instance.type_name(), error = %e, "组件停止失败");
                        }
                    }
                    self.set_state(index, LifecycleState::Failed);
                    report.faults.push(LifecycleFault { index, error: e });
                }
            }
        }

        debug!(
            "生命周期阶段 {} 完成: 成功 {}, 跳过 {}, 失败 {}",
            phase,
            report.completed,
            report.skipped,
            report.faults.len()
        );
        report
    }

    fn set_state(&self, index: usize, state: LifecycleState) {
        if let Some(slot) = self.states.lock().get_mut(index) {
            *slot = state;
        }
    }
}

fn phase_state(phase: LifecyclePhase) -> LifecycleState {
    match phase {
        LifecyclePhase::Start => LifecycleState::Running,
        LifecyclePhase::Shutdown => LifecycleState::Stopped,
    }
}

/// 在故障边界内调用钩子
fn invoke(
    phase: LifecyclePhase,
    type_name: &str,
    hook: &Arc<dyn Lifecycle>,
) -> Result<(), LifecycleError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match phase {
        LifecyclePhase::Start => hook.on_start(),
        LifecyclePhase::Shutdown => hook.on_stop(),
    }));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(match phase {
            LifecyclePhase::Start => LifecycleError::StartFailed {
                type_name: type_name.to_string(),
                source,
            },
            LifecyclePhase::Shutdown => LifecycleError::StopFailed {
                type_name: type_name.to_string(),
                source,
            },
        }),
        Err(payload) => Err(LifecycleError::Panicked {
            type_name: type_name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知 panic".to_string()
    }
}
