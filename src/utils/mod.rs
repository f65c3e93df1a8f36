// 工具模块 - 仅用于导出各个子模块，不包含具体实现

// ID工具模块
pub mod id_gen;
pub use id_gen::generate_node_id;

// 日志模块
pub mod logging;
