//! 研究状态：SharedState 与各阶段返回的局部更新 StateUpdate
//!
//! SharedState 由 Orchestrator 独占，每次研究新建一份；阶段只读它并返回 StateUpdate，
//! 由 apply 合并。合并规则保证：original_query / original_plan / final_report 只写一次，
//! error 一旦出现不再清除，且之后只允许补写 final_report。

use serde::{Deserialize, Serialize};

use crate::core::ResearchError;

/// Reflector 的判定
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Continue,
    Complete,
}

/// 一次研究的完整状态
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    pub original_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_plan: Option<Vec<String>>,
    pub questions_to_answer: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<String>,
    /// 每条为 JSON 编码的 {question, answer}
    pub synthesized_answers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub loop_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SharedState {
    /// 以主题创建初始状态：空队列、空答案、loop_count = 0
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            original_query: topic.into(),
            ..Default::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// 最近一条已合成答案
    pub fn latest_answer(&self) -> Option<&str> {
        self.synthesized_answers.last().map(String::as_str)
    }

    /// 合并一个阶段的局部更新
    pub fn apply(&mut self, update: StateUpdate) {
        if self.error.is_some() {
            if self.final_report.is_none() {
                self.final_report = update.final_report;
            }
            return;
        }

        if let Some(error) = update.error {
            self.error = Some(error);
            if self.final_report.is_none() {
                self.final_report = update.final_report;
            }
            return;
        }

        if self.original_plan.is_none() {
            if let Some(plan) = update.original_plan {
                self.original_plan = Some(plan);
            }
        }
        if let Some(queue) = update.questions_to_answer {
            self.questions_to_answer = queue;
        }
        if let Some(question) = update.current_question {
            self.current_question = Some(question);
        }
        if let Some(query) = update.search_query {
            self.search_query = Some(query);
        }
        if let Some(results) = update.search_results {
            self.search_results = Some(results);
        }
        if let Some(answer) = update.new_answer {
            self.synthesized_answers.push(answer);
        }
        if let Some(decision) = update.decision {
            self.decision = Some(decision);
        }
        if let Some(count) = update.loop_count {
            self.loop_count = self.loop_count.max(count);
        }
        if self.final_report.is_none() {
            self.final_report = update.final_report;
        }
    }
}

/// 阶段返回的局部更新；未设置的字段保持原值
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub original_plan: Option<Vec<String>>,
    pub questions_to_answer: Option<Vec<String>>,
    pub current_question: Option<String>,
    pub search_query: Option<String>,
    pub search_results: Option<String>,
    /// 追加到 synthesized_answers 的一条记录
    pub new_answer: Option<String>,
    pub decision: Option<Decision>,
    pub loop_count: Option<u32>,
    pub final_report: Option<String>,
    pub error: Option<String>,
}

impl StateUpdate {
    /// 失败更新：写入 error；护栏拒绝还带上固定的拒绝报告
    pub fn failed(err: &ResearchError) -> Self {
        Self {
            error: Some(err.to_string()),
            final_report: err.rejection_report().map(String::from),
            ..Default::default()
        }
    }

    pub fn report(report: impl Into<String>) -> Self {
        Self {
            final_report: Some(report.into()),
            ..Default::default()
        }
    }
}
