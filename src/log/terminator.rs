/// panic / fatal 级别记录写出后的终止动作
pub trait Terminator: Send + Sync {
    /// fatal：终止进程
    fn exit(&self, code: i32) -> !;

    /// panic：以消息触发 panic
    fn panic(&self, message: &str) -> !;
}

/// 默认终止器：fatal 以状态码退出进程，panic 触发当前线程 panic
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn exit(&self, code: i32) -> ! {
        std::process::exit(code)
    }

    fn panic(&self, message: &str) -> ! {
        panic!("{}", message)
    }
}
