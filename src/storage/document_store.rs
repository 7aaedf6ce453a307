// ==========================================
// 车间排程系统 - 文档内容寻址存储
// ==========================================
// 职责: 将上传文件按内容 SHA-256 存入受管目录
// 布局: <root>/<前2位>/<其余62位>，同内容只存一份
// 约束: 优先原子改名入库；跨文件系统时回退为复制+删除
// ==========================================

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 入库结果
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub checksum: String, // 内容 SHA-256 (hex)，同时是存储键
    pub size_bytes: i64,
}

// ==========================================
// DocumentStore - 受管文档目录
// ==========================================
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// 在指定根目录创建存储（目录不存在时自动创建）
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("创建文档存储目录失败: {}", root.display()))?;
        Ok(Self { root })
    }

    /// 默认受管目录: <平台数据目录>/workshop-planning/documents
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workshop-planning")
            .join("documents")
    }

    /// 计算文件内容的 SHA-256（流式，避免整读大文件）
    pub fn checksum_file(path: &Path) -> Result<(String, i64)> {
        let mut file = fs::File::open(path)
            .with_context(|| format!("打开上传文件失败: {}", path.display()))?;
        let mut hasher = Sha256::new();
        let size = io::copy(&mut file, &mut hasher)
            .with_context(|| format!("读取上传文件失败: {}", path.display()))?;
        Ok((hex::encode(hasher.finalize()), size as i64))
    }

    /// 存储键对应的落盘路径
    pub fn blob_path(&self, checksum: &str) -> PathBuf {
        let (shard, rest) = checksum.split_at(2.min(checksum.len()));
        self.root.join(shard).join(rest)
    }

    /// 将上传文件移入存储
    ///
    /// # 行为
    /// - 同内容已存在时直接去重（删除源文件）
    /// - `fs::rename` 失败（典型为跨文件系统 EXDEV）时回退为复制+删除
    pub fn ingest(&self, src: &Path) -> Result<StoredBlob> {
        let (checksum, size_bytes) = Self::checksum_file(src)?;
        let dest = self.blob_path(&checksum);

        if dest.exists() {
            // 内容寻址去重：目标已存在，源文件不再需要
            fs::remove_file(src)
                .with_context(|| format!("清理上传临时文件失败: {}", src.display()))?;
            return Ok(StoredBlob { checksum, size_bytes });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建存储分片目录失败: {}", parent.display()))?;
        }

        if fs::rename(src, &dest).is_err() {
            // 跨文件系统时 rename 不可用，回退为复制+删除
            fs::copy(src, &dest)
                .with_context(|| format!("复制上传文件入库失败: {}", dest.display()))?;
            fs::remove_file(src)
                .with_context(|| format!("清理上传临时文件失败: {}", src.display()))?;
        }

        Ok(StoredBlob { checksum, size_bytes })
    }

    /// 读取存储键对应的全部字节
    pub fn read(&self, checksum: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(checksum);
        fs::read(&path).with_context(|| format!("读取存储文档失败: {}", path.display()))
    }
}
