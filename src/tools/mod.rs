//! 工具层：搜索能力抽象、Google Custom Search 实现、执行器（审计 + 截断）与 Mock

pub mod executor;
pub mod google;
pub mod mock;
pub mod search;

pub use executor::ToolExecutor;
pub use google::{GoogleSearchTool, GOOGLE_SEARCH_ENDPOINT};
pub use mock::MockSearchTool;
pub use search::{SearchError, SearchHit, SearchTool};
