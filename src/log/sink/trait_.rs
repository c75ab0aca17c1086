use std::io;

/// 输出端 trait
///
/// 负责将编码后的字节写到目标介质；一次 write 调用相对同一输出端的其他写入是原子的
pub trait WriteSink: Send + Sync {
    /// 写入一条已编码的记录
    fn write(&self, buf: &[u8]) -> io::Result<()>;

    /// 刷新缓冲区（默认实现为空操作）
    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}
