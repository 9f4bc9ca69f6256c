//! 阶段错误策略
//!
//! FailClosed：内部失败向上传播，由 Orchestrator 写入 error 并转到 Reporter。
//! FailOpen：内部失败降级为默认值（如「没有新问题」），只记 warn。目前只有 Reflector 使用。

use crate::core::ResearchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    FailClosed,
    FailOpen,
}

impl ErrorPolicy {
    /// 按策略处理一次内部步骤的结果
    pub fn apply<T: Default>(
        self,
        stage: &'static str,
        result: Result<T, ResearchError>,
    ) -> Result<T, ResearchError> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (ErrorPolicy::FailClosed, Err(e)) => Err(e),
            (ErrorPolicy::FailOpen, Err(e)) => {
                tracing::warn!(stage, error = %e, "stage failure degraded to default");
                Ok(T::default())
            }
        }
    }
}
