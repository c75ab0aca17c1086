use crate::log::sink::WriteSink;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Timelike, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// RollingFileSink 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct RollingFileSinkConfig {
    /// 日志文件路径
    #[default("app.log".to_string())]
    pub filename: String,

    /// 单个文件最大字节数，0 表示不切分
    #[default(500 * 1024 * 1024)]
    pub max_size: u64,

    /// 备份文件最多保留天数，0 表示不按时间清理
    #[default(7)]
    pub max_age: u32,

    /// 备份文件最多保留个数，0 表示不按数量清理
    #[default(3)]
    pub max_backups: usize,

    /// 是否 gzip 压缩备份文件
    #[default(true)]
    pub compress: bool,

    /// 备份文件名中的时间戳是否使用本地时间
    #[default(true)]
    pub local_time: bool,
}

struct ActiveFile {
    file: Option<File>,
    size: u64,
    last_backup: Option<NaiveDateTime>,
}

/// 按大小切分的文件输出端
///
/// 写入将使当前文件超过 max_size 时，先把当前文件重命名为
/// `<stem>-<时间戳>.<ext>`（可选压缩为 `.gz`），再打开新的空文件继续写入。
/// 切分失败不影响本次写入，下一次写入会再次尝试。
pub struct RollingFileSink {
    config: RollingFileSinkConfig,
    path: PathBuf,
    dir: PathBuf,
    stem: String,
    ext: String,
    /// 切分时的重命名操作
    rename: fn(&Path, &Path) -> io::Result<()>,
    active: Mutex<ActiveFile>,
}

impl RollingFileSink {
    pub fn new(config: RollingFileSinkConfig) -> io::Result<Self> {
        let path = PathBuf::from(shellexpand::tilde(&config.filename).as_ref());
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid log file name: {}", config.filename),
                )
            })?;
        let ext = path
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "log".to_string());

        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            config,
            path,
            dir,
            stem,
            ext,
            rename: |from: &Path, to: &Path| fs::rename(from, to),
            active: Mutex::new(ActiveFile {
                file: Some(file),
                size,
                last_backup: None,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn now(&self) -> NaiveDateTime {
        if self.config.local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    fn backup_path(&self, ts: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.{}",
            self.stem,
            ts.format(BACKUP_TIME_FORMAT),
            self.ext
        ))
    }

    /// 解析备份文件名中的时间戳，不是本文件的备份时返回 None
    fn backup_time(&self, name: &str) -> Option<NaiveDateTime> {
        let name = name.strip_suffix(".gz").unwrap_or(name);
        let ts = name
            .strip_prefix(&self.stem)?
            .strip_prefix('-')?
            .strip_suffix(&self.ext)?
            .strip_suffix('.')?;
        NaiveDateTime::parse_from_str(ts, BACKUP_TIME_FORMAT).ok()
    }

    /// 当前目录下属于本文件的备份，按时间从新到旧排序
    pub fn backups(&self) -> io::Result<Vec<(NaiveDateTime, PathBuf)>> {
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(ts) = self.backup_time(name) {
                backups.push((ts, path));
            }
        }
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups)
    }

    /// 备份名或其压缩版本已存在
    fn backup_taken(&self, ts: NaiveDateTime) -> bool {
        let backup = self.backup_path(ts);
        backup.exists() || PathBuf::from(format!("{}.gz", backup.display())).exists()
    }

    fn rotate(&self, active: &mut ActiveFile) -> io::Result<()> {
        if let Some(file) = active.file.as_mut() {
            file.flush()?;
        }

        // 文件名精确到毫秒，同一毫秒内多次切分时顺延，保证备份名唯一且单调
        let now = self.now();
        let mut ts = now
            .with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
            .unwrap_or(now);
        if let Some(last) = active.last_backup {
            if ts <= last {
                ts = last + ChronoDuration::milliseconds(1);
            }
        }
        while self.backup_taken(ts) {
            ts += ChronoDuration::milliseconds(1);
        }

        let backup = self.backup_path(ts);
        if self.path.exists() {
            (self.rename)(&self.path, &backup)?;
        }
        active.last_backup = Some(ts);

        let file = open_append(&self.path)?;
        active.size = file.metadata()?.len();
        active.file = Some(file);

        if self.config.compress && backup.exists() {
            if let Err(e) = compress(&backup) {
                eprintln!("{} compress {} failed: {}", Utc::now(), backup.display(), e);
            }
        }

        self.cleanup()
    }

    fn cleanup(&self) -> io::Result<()> {
        if self.config.max_backups == 0 && self.config.max_age == 0 {
            return Ok(());
        }

        let cutoff = if self.config.max_age > 0 {
            Some(self.now() - ChronoDuration::days(self.config.max_age as i64))
        } else {
            None
        };

        for (i, (ts, path)) in self.backups()?.into_iter().enumerate() {
            let too_many = self.config.max_backups > 0 && i >= self.config.max_backups;
            let too_old = cutoff.map_or(false, |c| ts < c);
            if too_many || too_old {
                fs::remove_file(&path).ok();
            }
        }

        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn compress(path: &Path) -> io::Result<()> {
    let target = PathBuf::from(format!("{}.gz", path.display()));
    let mut source = File::open(path)?;

    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    fs::remove_file(path)
}

impl WriteSink for RollingFileSink {
    fn write(&self, buf: &[u8]) -> io::Result<()> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());

        let len = buf.len() as u64;
        if self.config.max_size > 0 && active.size > 0 && active.size + len > self.config.max_size {
            if let Err(e) = self.rotate(&mut active) {
                eprintln!("{} rotate {} failed: {}", Utc::now(), self.path.display(), e);
            }
        }

        if active.file.is_none() {
            active.file = Some(open_append(&self.path)?);
        }
        if let Some(file) = active.file.as_mut() {
            file.write_all(buf)?;
        }
        active.size += len;

        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = active.file.as_mut() {
            file.flush().ok();
            file.sync_data().ok();
        }
        Ok(())
    }
}
