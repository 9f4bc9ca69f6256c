//! PromptBuilder：无状态地把 {安全宪章, 角色指令, 任务载荷} 组成一次请求
//!
//! 宪章与角色指令进 system 消息，载荷进 user 消息；不再伪造「上一轮对话」。

use crate::llm::Message;
use crate::safety::SAFETY_CONSTITUTION;

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instructions: String,
}

impl PromptBuilder {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// 组装 system 指令；vars 中的 (key, value) 替换指令里的 `{key}` 占位符
    pub fn system(&self, vars: &[(&str, &str)]) -> String {
        let mut instructions = self.instructions.trim().to_string();
        for (key, value) in vars {
            instructions = instructions.replace(&format!("{{{key}}}"), value);
        }
        format!("{SAFETY_CONSTITUTION}\n\n{instructions}")
    }

    pub fn build(&self, payload: impl Into<String>) -> Vec<Message> {
        self.build_with(&[], payload)
    }

    pub fn build_with(&self, vars: &[(&str, &str)], payload: impl Into<String>) -> Vec<Message> {
        vec![Message::system(self.system(vars)), Message::user(payload)]
    }
}
