//! Console - 交互式命令行外壳
//!
//! 从标准输入读取命令，驱动客户端核心控制器

mod command;
mod shell;

pub use command::{CommandError, ShellCommand, HELP};
pub use shell::{ConsoleShell, ShellOutcome};
